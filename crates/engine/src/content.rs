use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};
use tracing::info;

use crate::geometry::Vec2;
use crate::texture::TextureId;
use crate::world::{CombatStats, Entity, EntityArchetype};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentErrorCode {
    ReadFile,
    XmlMalformed,
    InvalidRoot,
    UnknownDefType,
    UnknownField,
    DuplicateField,
    MissingField,
    InvalidValue,
    DuplicateDef,
}

#[derive(Debug, Clone)]
pub struct ContentError {
    pub code: ContentErrorCode,
    pub message: String,
    pub file_path: PathBuf,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{:?}: {} (file={}, line={}, column={})",
                self.code,
                self.message,
                self.file_path.display(),
                loc.line,
                loc.column
            ),
            None => write!(
                f,
                "{:?}: {} (file={})",
                self.code,
                self.message,
                self.file_path.display()
            ),
        }
    }
}

impl std::error::Error for ContentError {}

/// Spawn template for one archetype.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchetypeDef {
    pub archetype: EntityArchetype,
    pub texture: TextureId,
    pub stats: CombatStats,
}

impl ArchetypeDef {
    pub fn spawn(&self, position: Vec2) -> Entity {
        Entity::new(self.archetype, self.texture, position).with_stats(self.stats)
    }
}

#[derive(Debug, Clone)]
pub struct ArchetypeDatabase {
    defs: [ArchetypeDef; 3],
}

impl Default for ArchetypeDatabase {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ArchetypeDatabase {
    /// Player: walk 100 u/s, swipe 200 u/s over 50 u. Mobs carry no stats.
    pub fn builtin() -> Self {
        Self {
            defs: [
                ArchetypeDef {
                    archetype: EntityArchetype::Player,
                    texture: TextureId::Player,
                    stats: CombatStats {
                        movement_speed: 100.0,
                        attack_speed: 200.0,
                        attack_range: 50.0,
                        health: 0,
                        damage: 0,
                    },
                },
                ArchetypeDef {
                    archetype: EntityArchetype::Goblin,
                    texture: TextureId::Goblin,
                    stats: CombatStats::default(),
                },
                ArchetypeDef {
                    archetype: EntityArchetype::Troll,
                    texture: TextureId::Troll,
                    stats: CombatStats::default(),
                },
            ],
        }
    }

    pub fn get(&self, archetype: EntityArchetype) -> &ArchetypeDef {
        &self.defs[slot_of(archetype)]
    }

    pub fn spawn(&self, archetype: EntityArchetype, position: Vec2) -> Entity {
        self.get(archetype).spawn(position)
    }

    /// Loads `path` over the built-in table; a missing file keeps the
    /// built-ins.
    pub fn load(path: &Path) -> Result<Self, ContentError> {
        if !path.is_file() {
            info!(path = %path.display(), "archetype_defs_missing; using builtin table");
            return Ok(Self::builtin());
        }
        let raw = fs::read_to_string(path).map_err(|source| ContentError {
            code: ContentErrorCode::ReadFile,
            message: format!("failed to read XML file: {source}"),
            file_path: path.to_path_buf(),
            location: None,
        })?;
        let database = Self::from_xml_str(path, &raw)?;
        info!(path = %path.display(), "archetype_defs_loaded");
        Ok(database)
    }

    /// Every `<ArchetypeDef>` replaces the built-in entry of its archetype.
    /// Omitted fields keep the built-in values.
    pub fn from_xml_str(file_path: &Path, raw: &str) -> Result<Self, ContentError> {
        let doc = Document::parse(raw).map_err(|error| ContentError {
            code: ContentErrorCode::XmlMalformed,
            message: format!("malformed XML: {error}"),
            file_path: file_path.to_path_buf(),
            location: Some(SourceLocation {
                line: error.pos().row as usize,
                column: error.pos().col as usize,
            }),
        })?;

        let root = doc.root_element();
        if root.tag_name().name() != "Defs" {
            return Err(error_at_node(
                ContentErrorCode::InvalidRoot,
                "root element must be <Defs>".to_string(),
                file_path,
                &doc,
                root,
            ));
        }

        let mut database = Self::builtin();
        let mut seen = HashSet::<EntityArchetype>::new();
        for child in root.children().filter(|node| node.is_element()) {
            if child.tag_name().name() != "ArchetypeDef" {
                return Err(error_at_node(
                    ContentErrorCode::UnknownDefType,
                    format!(
                        "unsupported def type <{}>; expected <ArchetypeDef>",
                        child.tag_name().name()
                    ),
                    file_path,
                    &doc,
                    child,
                ));
            }
            let def = parse_archetype_def(&database, file_path, &doc, child)?;
            if !seen.insert(def.archetype) {
                return Err(error_at_node(
                    ContentErrorCode::DuplicateDef,
                    format!("duplicate ArchetypeDef '{}'", def.archetype.token()),
                    file_path,
                    &doc,
                    child,
                ));
            }
            database.defs[slot_of(def.archetype)] = def;
        }

        Ok(database)
    }
}

fn slot_of(archetype: EntityArchetype) -> usize {
    match archetype {
        EntityArchetype::Player => 0,
        EntityArchetype::Goblin => 1,
        EntityArchetype::Troll => 2,
    }
}

fn parse_archetype_def(
    builtin: &ArchetypeDatabase,
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
) -> Result<ArchetypeDef, ContentError> {
    let mut seen_fields = HashSet::<String>::new();
    let mut archetype: Option<EntityArchetype> = None;
    let mut texture: Option<TextureId> = None;
    let mut movement_speed: Option<f32> = None;
    let mut attack_speed: Option<f32> = None;
    let mut attack_range: Option<f32> = None;
    let mut health: Option<i32> = None;
    let mut damage: Option<i32> = None;

    for field in node.children().filter(|child| child.is_element()) {
        let field_name = field.tag_name().name().to_string();
        if !seen_fields.insert(field_name.clone()) {
            return Err(error_at_node(
                ContentErrorCode::DuplicateField,
                format!("duplicate field <{}> in <ArchetypeDef>", field_name),
                file_path,
                doc,
                field,
            ));
        }

        match field_name.as_str() {
            "archetype" => {
                let value = required_text(file_path, doc, field, "archetype")?;
                archetype = Some(EntityArchetype::from_token(&value).ok_or_else(|| {
                    error_at_node(
                        ContentErrorCode::InvalidValue,
                        format!(
                            "invalid archetype '{}'; allowed values: player, goblin, troll",
                            value
                        ),
                        file_path,
                        doc,
                        field,
                    )
                })?);
            }
            "texture" => {
                let value = required_text(file_path, doc, field, "texture")?;
                texture = Some(TextureId::from_token(&value).ok_or_else(|| {
                    error_at_node(
                        ContentErrorCode::InvalidValue,
                        format!(
                            "invalid texture '{}'; allowed values: nil, player, goblin, troll",
                            value
                        ),
                        file_path,
                        doc,
                        field,
                    )
                })?);
            }
            "movementSpeed" => {
                movement_speed = Some(parse_non_negative(file_path, doc, field, "movementSpeed")?);
            }
            "attackSpeed" => {
                attack_speed = Some(parse_non_negative(file_path, doc, field, "attackSpeed")?);
            }
            "attackRange" => {
                attack_range = Some(parse_non_negative(file_path, doc, field, "attackRange")?);
            }
            "health" => {
                health = Some(parse_int(file_path, doc, field, "health")?);
            }
            "damage" => {
                damage = Some(parse_int(file_path, doc, field, "damage")?);
            }
            _ => {
                return Err(error_at_node(
                    ContentErrorCode::UnknownField,
                    format!("unknown field <{}> in <ArchetypeDef>", field_name),
                    file_path,
                    doc,
                    field,
                ))
            }
        }
    }

    let Some(archetype) = archetype else {
        return Err(error_at_node(
            ContentErrorCode::MissingField,
            "missing required field <archetype> in <ArchetypeDef>".to_string(),
            file_path,
            doc,
            node,
        ));
    };

    let base = builtin.get(archetype);
    Ok(ArchetypeDef {
        archetype,
        texture: texture.unwrap_or(base.texture),
        stats: CombatStats {
            movement_speed: movement_speed.unwrap_or(base.stats.movement_speed),
            attack_speed: attack_speed.unwrap_or(base.stats.attack_speed),
            attack_range: attack_range.unwrap_or(base.stats.attack_range),
            health: health.unwrap_or(base.stats.health),
            damage: damage.unwrap_or(base.stats.damage),
        },
    })
}

fn parse_non_negative(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
    field_name: &str,
) -> Result<f32, ContentError> {
    let value = required_text(file_path, doc, node, field_name)?;
    let parsed = value.parse::<f32>().map_err(|_| {
        error_at_node(
            ContentErrorCode::InvalidValue,
            format!("{} '{}' is not a valid number", field_name, value),
            file_path,
            doc,
            node,
        )
    })?;
    if !parsed.is_finite() || parsed < 0.0 {
        return Err(error_at_node(
            ContentErrorCode::InvalidValue,
            format!("{} must be finite and >= 0", field_name),
            file_path,
            doc,
            node,
        ));
    }
    Ok(parsed)
}

fn parse_int(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
    field_name: &str,
) -> Result<i32, ContentError> {
    let value = required_text(file_path, doc, node, field_name)?;
    value.parse::<i32>().map_err(|_| {
        error_at_node(
            ContentErrorCode::InvalidValue,
            format!("{} '{}' is not a valid integer", field_name, value),
            file_path,
            doc,
            node,
        )
    })
}

fn required_text(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
    field_name: &str,
) -> Result<String, ContentError> {
    let value = node.text().map(str::trim).unwrap_or_default().to_string();
    if value.is_empty() {
        return Err(error_at_node(
            ContentErrorCode::MissingField,
            format!("field <{}> must not be empty", field_name),
            file_path,
            doc,
            node,
        ));
    }
    Ok(value)
}

fn error_at_node(
    code: ContentErrorCode,
    message: String,
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
) -> ContentError {
    let pos = doc.text_pos_at(node.range().start);
    ContentError {
        code,
        message,
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: pos.row as usize,
            column: pos.col as usize,
        }),
    }
}
