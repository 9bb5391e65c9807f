//! Entity <-> plain record conversion. Records are the only thing that crosses
//! the wire; `kind` stays a string so an unknown kind fails one record instead
//! of the whole packet.

use crate::entity::{Entity, Point};
use crate::kinds::create_entity;
use crate::lerp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Blend factor applied to positions when merging with smoothing.
pub const SMOOTHING_FACTOR: f32 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Flag(bool),
    Number(f32),
    Text(String),
    Point(Point),
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub kind: String,
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub dx: f32,
    pub dy: f32,
    pub dz: f32,
    pub done: bool,
    /// Kind-specific fields, sorted by name.
    pub fields: BTreeMap<String, FieldValue>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("unknown entity kind `{kind}` (id {id})")]
    UnknownKind { kind: String, id: String },

    #[error("record {id} is missing field `{field}`")]
    MissingField { id: String, field: &'static str },

    #[error("record {id} field `{field}` has the wrong type")]
    WrongType { id: String, field: &'static str },

    #[error("record {id} is a `{found}`, local entity is a `{expected}`")]
    KindMismatch {
        id: String,
        expected: &'static str,
        found: String,
    },
}

impl EntityRecord {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
            x: 0.0,
            y: 0.0,
            z: 0.0,
            dx: 0.0,
            dy: 0.0,
            dz: 0.0,
            done: false,
            fields: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, name: &str, value: FieldValue) {
        self.fields.insert(name.to_string(), value);
    }

    fn field(&self, name: &'static str) -> Result<&FieldValue, DecodeError> {
        self.fields
            .get(name)
            .ok_or_else(|| DecodeError::MissingField {
                id: self.id.clone(),
                field: name,
            })
    }

    fn wrong_type(&self, name: &'static str) -> DecodeError {
        DecodeError::WrongType {
            id: self.id.clone(),
            field: name,
        }
    }

    pub fn flag(&self, name: &'static str) -> Result<bool, DecodeError> {
        match self.field(name)? {
            FieldValue::Flag(value) => Ok(*value),
            _ => Err(self.wrong_type(name)),
        }
    }

    pub fn number(&self, name: &'static str) -> Result<f32, DecodeError> {
        match self.field(name)? {
            FieldValue::Number(value) => Ok(*value),
            _ => Err(self.wrong_type(name)),
        }
    }

    pub fn text(&self, name: &'static str) -> Result<String, DecodeError> {
        match self.field(name)? {
            FieldValue::Text(value) => Ok(value.clone()),
            _ => Err(self.wrong_type(name)),
        }
    }

    pub fn optional_point(&self, name: &'static str) -> Result<Option<Point>, DecodeError> {
        match self.field(name)? {
            FieldValue::Point(point) => Ok(Some(*point)),
            FieldValue::Nothing => Ok(None),
            _ => Err(self.wrong_type(name)),
        }
    }
}

impl Entity {
    pub fn to_record(&self) -> EntityRecord {
        let mut record = EntityRecord {
            kind: self.tag().to_string(),
            id: self.id.clone(),
            x: self.x,
            y: self.y,
            z: self.z,
            dx: self.dx,
            dy: self.dy,
            dz: self.dz,
            done: self.done,
            fields: BTreeMap::new(),
        };
        self.kind.behavior().write_fields(self, &mut record);
        record
    }

    /// Merges `record` into this entity. Positions blend by
    /// [`SMOOTHING_FACTOR`] when `smooth` is set and snap otherwise;
    /// velocities and `done` are always overwritten. Nothing is applied if
    /// any kind-specific field fails to decode.
    pub fn apply_record(&mut self, record: &EntityRecord, smooth: bool) -> Result<(), DecodeError> {
        if record.kind != self.tag() {
            return Err(DecodeError::KindMismatch {
                id: record.id.clone(),
                expected: self.tag(),
                found: record.kind.clone(),
            });
        }

        let behavior = self.kind.behavior();
        behavior.read_fields(self, record)?;

        let amount = if smooth { SMOOTHING_FACTOR } else { 1.0 };
        self.x = lerp(self.x, record.x, amount);
        self.y = lerp(self.y, record.y, amount);
        self.z = lerp(self.z, record.z, amount);
        self.dx = record.dx;
        self.dy = record.dy;
        self.dz = record.dz;
        self.done = record.done;
        Ok(())
    }

    /// Builds a fresh entity through the kind factory and snaps it onto `record`.
    pub fn from_record(record: &EntityRecord) -> Result<Entity, DecodeError> {
        let mut entity = create_entity(&record.kind, &record.id)?;
        entity.apply_record(record, false)?;
        Ok(entity)
    }
}
