use chrono::DateTime;
use serde_json::Value;
use uuid::Uuid;

/// Column type as persisted; drives SQL casts and payload validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    Numeric,
    Boolean,
    Timestamp,
    Uuid,
    Json,
}

impl FieldType {
    pub fn pg_type(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Integer => "bigint",
            FieldType::Numeric => "numeric",
            FieldType::Boolean => "boolean",
            FieldType::Timestamp => "timestamptz",
            FieldType::Uuid => "uuid",
            FieldType::Json => "jsonb",
        }
    }

    /// Whether a JSON payload value can be stored in a column of this type
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (FieldType::Text, Value::String(_)) => true,
            (FieldType::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (FieldType::Numeric, Value::Number(_)) => true,
            (FieldType::Boolean, Value::Bool(_)) => true,
            (FieldType::Timestamp, Value::String(s)) => DateTime::parse_from_rfc3339(s).is_ok(),
            (FieldType::Uuid, Value::String(s)) => Uuid::parse_str(s).is_ok(),
            (FieldType::Json, _) => true,
            _ => false,
        }
    }

    /// Whether a query-string value can be compared against this column
    pub fn accepts_text(&self, raw: &str) -> bool {
        match self {
            FieldType::Text => true,
            FieldType::Integer => raw.parse::<i64>().is_ok(),
            FieldType::Numeric => raw.parse::<f64>().is_ok(),
            FieldType::Boolean => raw.parse::<bool>().is_ok(),
            FieldType::Timestamp => DateTime::parse_from_rfc3339(raw).is_ok(),
            FieldType::Uuid => Uuid::parse_str(raw).is_ok(),
            FieldType::Json => false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub ty: FieldType,
    pub filterable: bool,
    pub writable: bool,
    pub required: bool,
}

impl FieldDef {
    const fn new(name: &'static str, ty: FieldType) -> Self {
        Self { name, ty, filterable: false, writable: false, required: false }
    }

    pub const fn text(name: &'static str) -> Self { Self::new(name, FieldType::Text) }
    pub const fn integer(name: &'static str) -> Self { Self::new(name, FieldType::Integer) }
    pub const fn numeric(name: &'static str) -> Self { Self::new(name, FieldType::Numeric) }
    pub const fn boolean(name: &'static str) -> Self { Self::new(name, FieldType::Boolean) }
    pub const fn timestamp(name: &'static str) -> Self { Self::new(name, FieldType::Timestamp) }
    pub const fn uuid(name: &'static str) -> Self { Self::new(name, FieldType::Uuid) }
    pub const fn json(name: &'static str) -> Self { Self::new(name, FieldType::Json) }

    pub const fn filter(mut self) -> Self {
        self.filterable = true;
        self
    }

    pub const fn write(mut self) -> Self {
        self.writable = true;
        self
    }

    pub const fn require(mut self) -> Self {
        self.required = true;
        self.writable = true;
        self
    }
}

pub const ID: &str = "id";
pub const ORGANIZATION_ID: &str = "organization_id";
pub const CREATED_AT: &str = "created_at";
pub const UPDATED_AT: &str = "updated_at";

/// Persisted shape of one entity: table, columns, and uniqueness constraints
#[derive(Debug)]
pub struct EntitySchema {
    pub table: &'static str,
    pub fields: &'static [FieldDef],
    /// Rows belong to exactly one organization via `organization_id`
    pub org_scoped: bool,
    /// Column sets that must be unique across the table
    pub unique: &'static [&'static [&'static str]],
}

impl EntitySchema {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn filterable(&self) -> Vec<&'static str> {
        self.fields.iter().filter(|f| f.filterable).map(|f| f.name).collect()
    }

    pub fn writable(&self) -> Vec<&'static str> {
        self.fields.iter().filter(|f| f.writable).map(|f| f.name).collect()
    }

    pub fn required(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.required)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Organization,
    User,
    Product,
    Component,
    Assessment,
    TraceabilityRequest,
    Document,
    Notification,
}

impl EntityKind {
    /// Every persisted entity, in table creation order
    pub const ALL: &'static [EntityKind] = &[
        EntityKind::Organization,
        EntityKind::User,
        EntityKind::Product,
        EntityKind::Component,
        EntityKind::Assessment,
        EntityKind::TraceabilityRequest,
        EntityKind::Document,
        EntityKind::Notification,
    ];

    /// Entities served by the generic organization-scoped CRUD routes
    pub const ROUTED: &'static [EntityKind] = &[
        EntityKind::Product,
        EntityKind::Component,
        EntityKind::Assessment,
        EntityKind::TraceabilityRequest,
        EntityKind::Document,
        EntityKind::Notification,
    ];

    /// Resolve a `/api/:entity` path segment
    pub fn from_route(segment: &str) -> Option<Self> {
        Self::ROUTED.iter().copied().find(|k| k.route() == segment)
    }

    pub fn route(&self) -> &'static str {
        match self {
            EntityKind::Organization => "organizations",
            EntityKind::User => "users",
            EntityKind::Product => "products",
            EntityKind::Component => "components",
            EntityKind::Assessment => "assessments",
            EntityKind::TraceabilityRequest => "traceability-requests",
            EntityKind::Document => "documents",
            EntityKind::Notification => "notifications",
        }
    }

    pub fn schema(&self) -> &'static EntitySchema {
        match self {
            EntityKind::Organization => &ORGANIZATIONS,
            EntityKind::User => &USERS,
            EntityKind::Product => &PRODUCTS,
            EntityKind::Component => &COMPONENTS,
            EntityKind::Assessment => &ASSESSMENTS,
            EntityKind::TraceabilityRequest => &TRACEABILITY_REQUESTS,
            EntityKind::Document => &DOCUMENTS,
            EntityKind::Notification => &NOTIFICATIONS,
        }
    }
}

// System columns shared by every table; never writable through the API
const SYSTEM: [FieldDef; 3] = [
    FieldDef::uuid(ID).filter(),
    FieldDef::timestamp(CREATED_AT).filter(),
    FieldDef::timestamp(UPDATED_AT).filter(),
];

const SCOPE: FieldDef = FieldDef::uuid(ORGANIZATION_ID);

pub static ORGANIZATIONS: EntitySchema = EntitySchema {
    table: "organizations",
    fields: &[
        SYSTEM[0], SYSTEM[1], SYSTEM[2],
        FieldDef::text("name").filter().require(),
        FieldDef::text("email").filter().write(),
        FieldDef::text("address").filter().write(),
        FieldDef::text("industry").write(),
        FieldDef::text("website").write(),
    ],
    org_scoped: false,
    unique: &[&["name"]],
};

pub static USERS: EntitySchema = EntitySchema {
    table: "users",
    fields: &[
        SYSTEM[0], SYSTEM[1], SYSTEM[2],
        FieldDef::text("external_id").filter().require(),
        FieldDef::text("email").filter().write(),
        FieldDef::text("first_name").write(),
        FieldDef::text("last_name").write(),
        FieldDef::uuid(ORGANIZATION_ID).filter().write(),
        FieldDef::text("role").filter().write(),
        FieldDef::boolean("is_active").filter().write(),
    ],
    org_scoped: false,
    unique: &[&["external_id"]],
};

pub static PRODUCTS: EntitySchema = EntitySchema {
    table: "products",
    fields: &[
        SYSTEM[0], SYSTEM[1], SYSTEM[2], SCOPE,
        FieldDef::text("name").filter().require(),
        FieldDef::text("sku").filter().write(),
        FieldDef::text("category").filter().write(),
        FieldDef::text("type").filter().write(),
        FieldDef::text("status").filter().write(),
        FieldDef::text("description").write(),
        FieldDef::numeric("carbon_footprint_kg").filter().write(),
    ],
    org_scoped: true,
    unique: &[&[ORGANIZATION_ID, "sku"]],
};

pub static COMPONENTS: EntitySchema = EntitySchema {
    table: "components",
    fields: &[
        SYSTEM[0], SYSTEM[1], SYSTEM[2], SCOPE,
        FieldDef::text("name").filter().require(),
        FieldDef::text("sku").filter().write(),
        FieldDef::uuid("product_id").filter().write(),
        FieldDef::uuid("supplier_organization_id").filter().write(),
        FieldDef::text("material").filter().write(),
        FieldDef::text("origin_country").filter().write(),
        FieldDef::text("status").filter().write(),
        FieldDef::numeric("weight_kg").filter().write(),
    ],
    org_scoped: true,
    unique: &[&[ORGANIZATION_ID, "sku"]],
};

pub static ASSESSMENTS: EntitySchema = EntitySchema {
    table: "assessments",
    fields: &[
        SYSTEM[0], SYSTEM[1], SYSTEM[2], SCOPE,
        FieldDef::text("title").filter().require(),
        FieldDef::text("type").filter().write(),
        FieldDef::text("status").filter().write(),
        FieldDef::numeric("score").filter().write(),
        FieldDef::uuid("product_id").filter().write(),
        FieldDef::timestamp("due_date").filter().write(),
        FieldDef::json("answers").write(),
    ],
    org_scoped: true,
    unique: &[],
};

pub static TRACEABILITY_REQUESTS: EntitySchema = EntitySchema {
    table: "traceability_requests",
    fields: &[
        SYSTEM[0], SYSTEM[1], SYSTEM[2], SCOPE,
        FieldDef::uuid("supplier_organization_id").filter().require(),
        FieldDef::uuid("product_id").filter().write(),
        FieldDef::uuid("component_id").filter().write(),
        FieldDef::text("status").filter().write(),
        FieldDef::text("priority").filter().write(),
        FieldDef::text("message").write(),
        FieldDef::timestamp("due_date").filter().write(),
    ],
    org_scoped: true,
    unique: &[],
};

pub static DOCUMENTS: EntitySchema = EntitySchema {
    table: "documents",
    fields: &[
        SYSTEM[0], SYSTEM[1], SYSTEM[2], SCOPE,
        FieldDef::text("name").filter().require(),
        FieldDef::text("document_type").filter().write(),
        FieldDef::text("file_url").write(),
        FieldDef::integer("file_size").write(),
        FieldDef::text("mime_type").filter().write(),
        FieldDef::uuid("related_entity_id").filter().write(),
    ],
    org_scoped: true,
    unique: &[],
};

pub static NOTIFICATIONS: EntitySchema = EntitySchema {
    table: "notifications",
    fields: &[
        SYSTEM[0], SYSTEM[1], SYSTEM[2], SCOPE,
        FieldDef::text("title").require(),
        FieldDef::text("message").write(),
        FieldDef::text("type").filter().write(),
        FieldDef::boolean("is_read").filter().write(),
        FieldDef::uuid("user_id").filter().write(),
    ],
    org_scoped: true,
    unique: &[],
};
