use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Named attributes attached to an entity or edge, ordered by name.
pub type Properties = BTreeMap<String, Value>;

/// How an edge seed constrains the directedness of matching edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DirectedType {
    /// Only directed edges.
    Directed,
    /// Only undirected edges.
    Undirected,
    /// Directed or undirected edges.
    Either,
}

impl DirectedType {
    /// Name used in Gaffer JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            DirectedType::Directed => "DIRECTED",
            DirectedType::Undirected => "UNDIRECTED",
            DirectedType::Either => "EITHER",
        }
    }

    /// Directed type matching a plain directedness flag.
    pub fn from_directed(directed: bool) -> Self {
        if directed {
            DirectedType::Directed
        } else {
            DirectedType::Undirected
        }
    }
}

impl fmt::Display for DirectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DirectedType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DIRECTED" => Ok(DirectedType::Directed),
            "UNDIRECTED" => Ok(DirectedType::Undirected),
            "EITHER" => Ok(DirectedType::Either),
            other => Err(format!("unknown directed type '{other}'")),
        }
    }
}

/// Which end of an edge matched the seed that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchedVertex {
    /// The edge source matched.
    Source,
    /// The edge destination matched.
    Destination,
}

impl MatchedVertex {
    /// Name used in Gaffer JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchedVertex::Source => "SOURCE",
            MatchedVertex::Destination => "DESTINATION",
        }
    }
}

impl fmt::Display for MatchedVertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchedVertex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SOURCE" => Ok(MatchedVertex::Source),
            "DESTINATION" => Ok(MatchedVertex::Destination),
            other => Err(format!("unknown matched vertex '{other}'")),
        }
    }
}

/// A single vertex and its properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Element group (schema type).
    pub group: String,
    /// Vertex identifier.
    pub vertex: Value,
    /// Entity properties.
    pub properties: Properties,
}

impl Entity {
    /// Create an entity without properties.
    pub fn new(group: impl Into<String>, vertex: impl Into<Value>) -> Self {
        Self {
            group: group.into(),
            vertex: vertex.into(),
            properties: Properties::new(),
        }
    }

    /// Replace all properties.
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Add or update a single property.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}

/// A link between two vertices, optionally directed.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Element group (schema type).
    pub group: String,
    /// Source vertex.
    pub source: Value,
    /// Destination vertex.
    pub destination: Value,
    /// Whether the edge is directed.
    pub directed: bool,
    /// Edge properties.
    pub properties: Properties,
    /// End of the edge that matched the query seed, if reported.
    pub matched_vertex: Option<MatchedVertex>,
}

impl Edge {
    /// Create an edge without properties or matched vertex.
    pub fn new(
        group: impl Into<String>,
        source: impl Into<Value>,
        destination: impl Into<Value>,
        directed: bool,
    ) -> Self {
        Self {
            group: group.into(),
            source: source.into(),
            destination: destination.into(),
            directed,
            properties: Properties::new(),
            matched_vertex: None,
        }
    }

    /// Replace all properties.
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Add or update a single property.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Record which end of the edge matched the seed.
    pub fn with_matched_vertex(mut self, matched_vertex: MatchedVertex) -> Self {
        self.matched_vertex = Some(matched_vertex);
        self
    }
}

/// Reference to a single vertex, used to seed a query.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySeed {
    /// Vertex identifier.
    pub vertex: Value,
}

impl EntitySeed {
    /// Create a seed for `vertex`.
    pub fn new(vertex: impl Into<Value>) -> Self {
        Self {
            vertex: vertex.into(),
        }
    }
}

/// Reference to the endpoints of an edge, used to seed a query.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSeed {
    /// Source vertex.
    pub source: Value,
    /// Destination vertex.
    pub destination: Value,
    /// Directedness constraint.
    pub directed_type: DirectedType,
    /// End of the edge that matched, if reported.
    pub matched_vertex: Option<MatchedVertex>,
}

impl EdgeSeed {
    /// Create an edge seed with no matched vertex.
    pub fn new(
        source: impl Into<Value>,
        destination: impl Into<Value>,
        directed_type: DirectedType,
    ) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            directed_type,
            matched_vertex: None,
        }
    }

    /// Record which end of the edge matched.
    pub fn with_matched_vertex(mut self, matched_vertex: MatchedVertex) -> Self {
        self.matched_vertex = Some(matched_vertex);
        self
    }
}

/// Every object a raw record can convert into.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// A vertex with properties.
    Entity(Entity),
    /// A link between two vertices.
    Edge(Edge),
    /// A vertex reference.
    EntitySeed(EntitySeed),
    /// An edge endpoint reference.
    EdgeSeed(EdgeSeed),
    /// A decoded JSON value that carries no recognised class.
    Json(Value),
}

impl Element {
    /// Tag naming the variant. Element kinds match the raw record `type` values.
    pub fn kind(&self) -> &'static str {
        match self {
            Element::Entity(_) => "entity",
            Element::Edge(_) => "edge",
            Element::EntitySeed(_) => "entity_seed",
            Element::EdgeSeed(_) => "edge_seed",
            Element::Json(_) => "json",
        }
    }

    /// Group of an entity or edge.
    pub fn group(&self) -> Option<&str> {
        match self {
            Element::Entity(entity) => Some(&entity.group),
            Element::Edge(edge) => Some(&edge.group),
            _ => None,
        }
    }

    /// Properties of an entity or edge.
    pub fn properties(&self) -> Option<&Properties> {
        match self {
            Element::Entity(entity) => Some(&entity.properties),
            Element::Edge(edge) => Some(&edge.properties),
            _ => None,
        }
    }
}

impl From<Entity> for Element {
    fn from(entity: Entity) -> Self {
        Element::Entity(entity)
    }
}

impl From<Edge> for Element {
    fn from(edge: Edge) -> Self {
        Element::Edge(edge)
    }
}

impl From<EntitySeed> for Element {
    fn from(seed: EntitySeed) -> Self {
        Element::EntitySeed(seed)
    }
}

impl From<EdgeSeed> for Element {
    fn from(seed: EdgeSeed) -> Self {
        Element::EdgeSeed(seed)
    }
}
