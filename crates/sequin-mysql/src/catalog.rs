//! Catalog tree model fed to the interactive tool.

/// Whether a relation is a base table or a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// A base table.
    Table,
    /// A view.
    View,
}

impl RelationKind {
    /// Parse the one-character label produced by the relations query.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        if label == "v" { Self::View } else { Self::Table }
    }

    /// The one-character display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Table => "t",
            Self::View => "v",
        }
    }
}

/// Discriminator for catalog tree nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogItemKind {
    /// A database (schema).
    Database,
    /// A base table.
    Table,
    /// A view.
    View,
    /// A column of a table or view.
    Column,
}

/// One node of the catalog tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    /// Fully-qualified, backtick-quoted identifier.
    pub qualified_identifier: String,
    /// The text inserted into the editor when the item is picked.
    pub query_name: String,
    /// Bare display name.
    pub label: String,
    /// Short type annotation shown next to the label.
    pub type_label: String,
    /// What this node is.
    pub kind: CatalogItemKind,
    /// Child nodes (relations of a database, columns of a relation).
    pub children: Vec<CatalogItem>,
}

impl CatalogItem {
    pub(crate) fn database(name: &str, children: Vec<CatalogItem>) -> Self {
        Self {
            qualified_identifier: format!("`{name}`"),
            query_name: format!("`{name}`"),
            label: name.to_string(),
            type_label: "db".to_string(),
            kind: CatalogItemKind::Database,
            children,
        }
    }

    pub(crate) fn relation(
        database: &str,
        name: &str,
        kind: RelationKind,
        children: Vec<CatalogItem>,
    ) -> Self {
        Self {
            qualified_identifier: format!("`{database}`.`{name}`"),
            query_name: format!("`{database}`.`{name}`"),
            label: name.to_string(),
            type_label: kind.label().to_string(),
            kind: match kind {
                RelationKind::Table => CatalogItemKind::Table,
                RelationKind::View => CatalogItemKind::View,
            },
            children,
        }
    }

    pub(crate) fn column(database: &str, relation: &str, name: &str, type_label: &str) -> Self {
        Self {
            qualified_identifier: format!("`{database}`.`{relation}`.`{name}`"),
            query_name: format!("`{name}`"),
            label: name.to_string(),
            type_label: type_label.to_string(),
            kind: CatalogItemKind::Column,
            children: Vec::new(),
        }
    }
}

/// The full database → relation → column tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// Top-level database items.
    pub items: Vec<CatalogItem>,
}
