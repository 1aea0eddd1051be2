//! Entity schema: the node kinds, scalar fields and relationships the
//! query builders and views know about.
//!
//! Everything here is static data. The compiler uses it to pick backend edge
//! names, the builders use it to validate runtime-named predicates, and the
//! views use it to find nested relationship keys in result rows.

use std::fmt;

/// The kind of entity a query node or view describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Process,
    File,
}

impl EntityKind {
    /// Scalar fields in declaration order.
    pub fn fields(self) -> &'static [Field] {
        match self {
            EntityKind::Process => PROCESS_FIELDS,
            EntityKind::File => FILE_FIELDS,
        }
    }

    /// Relationships in declaration order.
    pub fn relations(self) -> &'static [Relation] {
        match self {
            EntityKind::Process => PROCESS_RELATIONS,
            EntityKind::File => FILE_RELATIONS,
        }
    }

    /// Look up a scalar field by name.
    pub fn field(self, name: &str) -> Option<&'static Field> {
        self.fields().iter().find(|f| f.name == name)
    }

    /// Field whose presence selects every node of this kind.
    pub fn anchor_field(self) -> &'static str {
        match self {
            EntityKind::Process => "process_id",
            EntityKind::File => "file_path",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Process => write!(f, "process"),
            EntityKind::File => write!(f, "file"),
        }
    }
}

/// Value type of a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Str,
    Int,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Str => write!(f, "string"),
            FieldType::Int => write!(f, "integer"),
        }
    }
}

/// A named scalar attribute of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub ty: FieldType,
}

impl Field {
    const fn str(name: &'static str) -> Self {
        Self { name, ty: FieldType::Str }
    }

    const fn int(name: &'static str) -> Self {
        Self { name, ty: FieldType::Int }
    }
}

/// Identity field shared by every entity kind.
pub const NODE_KEY: &str = "node_key";

const PROCESS_FIELDS: &[Field] = &[
    Field::str("process_name"),
    Field::str("process_command_line"),
    Field::str("process_guid"),
    Field::int("process_id"),
    Field::int("created_timestamp"),
    Field::int("terminated_timestamp"),
    Field::int("last_seen_timestamp"),
];

const FILE_FIELDS: &[Field] = &[
    Field::str("file_name"),
    Field::str("file_path"),
    Field::str("file_extension"),
    Field::str("file_mime_type"),
    Field::int("file_size"),
    Field::str("file_version"),
    Field::str("file_description"),
    Field::str("file_product"),
    Field::str("file_company"),
    Field::str("file_directory"),
    Field::int("file_inode"),
    Field::int("file_hard_links"),
    Field::str("md5_hash"),
    Field::str("sha1_hash"),
    Field::str("sha256_hash"),
];

const PROCESS_RELATIONS: &[Relation] = &[
    Relation::Parent,
    Relation::BinFile,
    Relation::Children,
    Relation::DeletedFiles,
    Relation::CreatedFiles,
    Relation::WroteFiles,
    Relation::ReadFiles,
];

const FILE_RELATIONS: &[Relation] = &[
    Relation::Creator,
    Relation::Deleter,
    Relation::Writers,
    Relation::Readers,
    Relation::SpawnedFrom,
];

/// A named relationship slot between two entities.
///
/// Every relation has a natural inverse; linking one end through a query
/// builder always sets the other end too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Relation {
    Parent,
    Children,
    BinFile,
    DeletedFiles,
    CreatedFiles,
    WroteFiles,
    ReadFiles,
    SpawnedFrom,
    Deleter,
    Creator,
    Writers,
    Readers,
}

impl Relation {
    /// Name used by builders and introspection (`get_edges`).
    pub fn name(self) -> &'static str {
        match self {
            Relation::Parent => "parent",
            Relation::Children => "children",
            Relation::BinFile => "bin_file",
            Relation::DeletedFiles => "deleted_files",
            Relation::CreatedFiles => "created_files",
            Relation::WroteFiles => "wrote_files",
            Relation::ReadFiles => "read_files",
            Relation::SpawnedFrom => "spawned_from",
            Relation::Deleter => "deleter",
            Relation::Creator => "creator",
            Relation::Writers => "writers",
            Relation::Readers => "readers",
        }
    }

    /// Predicate name in the graph store. Reverse traversals carry a `~`.
    pub fn edge_name(self) -> &'static str {
        match self {
            Relation::Parent => "~children",
            Relation::Children => "children",
            Relation::BinFile => "bin_file",
            Relation::DeletedFiles => "deleted_files",
            Relation::CreatedFiles => "created_files",
            Relation::WroteFiles => "wrote_files",
            Relation::ReadFiles => "read_files",
            Relation::SpawnedFrom => "~bin_file",
            Relation::Deleter => "~deleted_files",
            Relation::Creator => "~created_files",
            Relation::Writers => "~wrote_files",
            Relation::Readers => "~read_files",
        }
    }

    pub fn inverse(self) -> Relation {
        match self {
            Relation::Parent => Relation::Children,
            Relation::Children => Relation::Parent,
            Relation::BinFile => Relation::SpawnedFrom,
            Relation::SpawnedFrom => Relation::BinFile,
            Relation::DeletedFiles => Relation::Deleter,
            Relation::Deleter => Relation::DeletedFiles,
            Relation::CreatedFiles => Relation::Creator,
            Relation::Creator => Relation::CreatedFiles,
            Relation::WroteFiles => Relation::Writers,
            Relation::Writers => Relation::WroteFiles,
            Relation::ReadFiles => Relation::Readers,
            Relation::Readers => Relation::ReadFiles,
        }
    }

    /// Kind of the entity that owns this slot.
    pub fn source(self) -> EntityKind {
        match self {
            Relation::Parent
            | Relation::Children
            | Relation::BinFile
            | Relation::DeletedFiles
            | Relation::CreatedFiles
            | Relation::WroteFiles
            | Relation::ReadFiles => EntityKind::Process,
            Relation::SpawnedFrom
            | Relation::Deleter
            | Relation::Creator
            | Relation::Writers
            | Relation::Readers => EntityKind::File,
        }
    }

    /// Kind of the entity the slot points at.
    pub fn target(self) -> EntityKind {
        self.inverse().source()
    }

    /// Whether result rows carry a list of neighbors (vs. a single one).
    pub fn is_many(self) -> bool {
        !matches!(
            self,
            Relation::Parent | Relation::BinFile | Relation::Deleter | Relation::Creator
        )
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
