//! Value types
//!
//! The closed set of runtime values a row can carry.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeMap;
use std::fmt;

/// A single row value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Zoned date-time
    DateTime(DateTime<FixedOffset>),
    /// Date-time without zone, interpreted as UTC when encoded as a timestamp
    LocalDateTime(NaiveDateTime),
    Date(NaiveDate),
    /// Time of day without zone
    LocalTime(NaiveTime),
    Duration(IsoDuration),
    Point(Point),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// Reference to a node entity
    Node(Box<Node>),
    /// Reference to a relationship entity
    Relationship(Box<Relationship>),
}

impl Value {
    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the string content if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the integer content if this is an integer value
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Build a map value from key/value pairs
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<Node> for Value {
    fn from(v: Node) -> Self {
        Value::Node(Box::new(v))
    }
}

impl From<Relationship> for Value {
    fn from(v: Relationship) -> Self {
        Value::Relationship(Box::new(v))
    }
}

/// Calendar-aware duration (months, days, seconds, nanoseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IsoDuration {
    pub months: i64,
    pub days: i64,
    pub seconds: i64,
    pub nanos: i32,
}

impl IsoDuration {
    /// Create a new duration from its components
    pub fn new(months: i64, days: i64, seconds: i64, nanos: i32) -> Self {
        Self {
            months,
            days,
            seconds,
            nanos,
        }
    }

    /// Check if every component is zero
    pub fn is_zero(&self) -> bool {
        self.months == 0 && self.days == 0 && self.seconds == 0 && self.nanos == 0
    }
}

impl fmt::Display for IsoDuration {
    /// ISO-8601 form, e.g. `P1Y2M3DT4H5M6.5S`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "PT0S");
        }

        write!(f, "P")?;
        let years = self.months / 12;
        let months = self.months % 12;
        if years != 0 {
            write!(f, "{years}Y")?;
        }
        if months != 0 {
            write!(f, "{months}M")?;
        }
        if self.days != 0 {
            write!(f, "{}D", self.days)?;
        }

        let hours = self.seconds / 3600;
        let minutes = (self.seconds % 3600) / 60;
        let seconds = self.seconds % 60;
        if hours == 0 && minutes == 0 && seconds == 0 && self.nanos == 0 {
            return Ok(());
        }

        write!(f, "T")?;
        if hours != 0 {
            write!(f, "{hours}H")?;
        }
        if minutes != 0 {
            write!(f, "{minutes}M")?;
        }
        if self.nanos != 0 {
            let fraction = format!("{:09}", self.nanos.unsigned_abs());
            write!(f, "{seconds}.{}S", fraction.trim_end_matches('0'))?;
        } else if seconds != 0 {
            write!(f, "{seconds}S")?;
        }
        Ok(())
    }
}

/// Coordinate reference system of a point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crs {
    Cartesian,
    Cartesian3D,
    Wgs84,
    Wgs84_3D,
}

impl Crs {
    /// Canonical name used in serialized points
    pub fn name(self) -> &'static str {
        match self {
            Crs::Cartesian => "cartesian",
            Crs::Cartesian3D => "cartesian-3d",
            Crs::Wgs84 => "wgs-84",
            Crs::Wgs84_3D => "wgs-84-3d",
        }
    }

    /// Parse a canonical CRS name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "cartesian" => Some(Crs::Cartesian),
            "cartesian-3d" => Some(Crs::Cartesian3D),
            "wgs-84" => Some(Crs::Wgs84),
            "wgs-84-3d" => Some(Crs::Wgs84_3D),
            _ => None,
        }
    }

    /// Whether coordinates are longitude/latitude
    pub fn is_geographic(self) -> bool {
        matches!(self, Crs::Wgs84 | Crs::Wgs84_3D)
    }
}

/// Geometry point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub crs: Crs,
    /// x or longitude
    pub x: f64,
    /// y or latitude
    pub y: f64,
    /// z or height
    pub z: Option<f64>,
}

impl Point {
    /// Create a 2D cartesian point
    pub fn cartesian(x: f64, y: f64) -> Self {
        Self {
            crs: Crs::Cartesian,
            x,
            y,
            z: None,
        }
    }

    /// Create a geographic point
    pub fn wgs84(longitude: f64, latitude: f64, height: Option<f64>) -> Self {
        Self {
            crs: if height.is_some() {
                Crs::Wgs84_3D
            } else {
                Crs::Wgs84
            },
            x: longitude,
            y: latitude,
            z: height,
        }
    }
}

/// A node entity: identity, labels and attributes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    pub id: i64,
    pub labels: Vec<String>,
    pub properties: BTreeMap<String, Value>,
}

impl Node {
    /// Create a node without properties
    pub fn new(id: i64, labels: &[&str]) -> Self {
        Self {
            id,
            labels: labels.iter().map(|l| (*l).to_string()).collect(),
            properties: BTreeMap::new(),
        }
    }

    /// Set a property
    #[must_use]
    pub fn with_property(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }
}

/// A relationship entity: identity, type, endpoints and attributes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Relationship {
    pub id: i64,
    pub rel_type: String,
    pub start: i64,
    pub end: i64,
    pub properties: BTreeMap<String, Value>,
}

impl Relationship {
    /// Create a relationship without properties
    pub fn new(id: i64, rel_type: &str, start: i64, end: i64) -> Self {
        Self {
            id,
            rel_type: rel_type.to_string(),
            start,
            end,
            properties: BTreeMap::new(),
        }
    }

    /// Set a property
    #[must_use]
    pub fn with_property(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }
}
