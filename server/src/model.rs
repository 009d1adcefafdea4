// MRT
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Data types for the records managed by the service.

use mrt_core::model::{DocId, ModelError, ModelResult};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// Operations common to every record type exposed by the service.
pub trait Resource: Clone + fmt::Debug + DeserializeOwned + Serialize + Send + Sync + 'static {
    /// Human-readable name of the resource, used in error messages.
    const NAME: &'static str;

    /// Returns the identifier of the record, if it has been stored.
    fn id(&self) -> Option<DocId>;

    /// Returns the record with its identifier replaced by `id`.
    fn with_id(self, id: DocId) -> Self;
}

/// Implements `Resource` for a record type with an `id: Option<DocId>` field.
macro_rules! impl_resource [
    ( $t:ty, $name:expr ) => {
        impl Resource for $t {
            const NAME: &'static str = $name;

            fn id(&self) -> Option<DocId> {
                self.id
            }

            fn with_id(mut self, id: DocId) -> Self {
                self.id = Some(id);
                self
            }
        }
    }
];

/// A point in time expressed as `YYYY-MM-DD HH:MM:SS` without a time zone.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Timestamp(PrimitiveDateTime);

impl Timestamp {
    /// Parses a timestamp from an untrusted string `s`.  Fractional seconds are accepted and kept.
    pub fn parse<S: AsRef<str>>(s: S) -> ModelResult<Self> {
        let s = s.as_ref();
        let layout = format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]"
        );
        match PrimitiveDateTime::parse(s, layout) {
            Ok(dt) => Ok(Self(dt)),
            Err(e) => Err(ModelError(format!("Invalid timestamp '{}': {}", s, e))),
        }
    }
}

impl From<PrimitiveDateTime> for Timestamp {
    fn from(dt: PrimitiveDateTime) -> Self {
        Self(dt)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layout = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
        match self.0.format(layout) {
            Ok(s) => f.write_str(&s),
            Err(_) => Err(fmt::Error),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(raw).map_err(D::Error::custom)
    }
}

/// Deserializes a value where `null` stands for the type's default, like an absent field does.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserializes an optional string-encoded value with `parse`, where both `null` and the empty
/// string mean "absent".
fn deserialize_optional_with<'de, D, T>(
    deserializer: D,
    parse: fn(String) -> ModelResult<T>,
) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.is_empty() => Ok(None),
        Some(raw) => parse(raw).map(Some).map_err(D::Error::custom),
    }
}

fn deserialize_optional_timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_optional_with(deserializer, Timestamp::parse)
}

fn deserialize_optional_docid<'de, D>(deserializer: D) -> Result<Option<DocId>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_optional_with(deserializer, DocId::parse)
}

/// Counts of coliform bacteria in a water sample.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Coliforms {
    /// Fecal coliforms.
    #[serde(deserialize_with = "null_as_default")]
    pub fecal: f64,

    /// Escherichia coli.
    #[serde(rename = "E_coli", deserialize_with = "null_as_default")]
    pub e_coli: f64,

    /// Total coliforms.
    #[serde(deserialize_with = "null_as_default")]
    pub total: f64,
}

/// A single reading of waste-water quality measurements.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct WasteWaterData {
    /// Identifier assigned by the storage layer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<DocId>,

    /// When the sample was taken.
    #[serde(with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,

    /// Biochemical oxygen demand.
    #[serde(rename = "BOD", deserialize_with = "null_as_default")]
    pub bod: f64,

    /// Chemical oxygen demand.
    #[serde(rename = "COD", deserialize_with = "null_as_default")]
    pub cod: f64,

    /// Total organic carbon.
    #[serde(rename = "TOC", deserialize_with = "null_as_default")]
    pub toc: f64,

    /// Dissolved organic carbon.
    #[serde(rename = "DOC", deserialize_with = "null_as_default")]
    pub doc: f64,

    /// Optical brighteners.
    #[serde(rename = "Optical_Brighteners", deserialize_with = "null_as_default")]
    pub optical_brighteners: f64,

    /// Ammonium.
    #[serde(rename = "Ammonium", deserialize_with = "null_as_default")]
    pub ammonium: f64,

    /// Dissolved oxygen.
    #[serde(rename = "Dissolved_Oxygen", deserialize_with = "null_as_default")]
    pub dissolved_oxygen: f64,

    /// Nitrate.
    #[serde(rename = "Nitrate", deserialize_with = "null_as_default")]
    pub nitrate: f64,

    /// Electrical conductivity, salinity and total dissolved solids.
    #[serde(rename = "EC_Salinity_TDS", deserialize_with = "null_as_default")]
    pub ec_salinity_tds: f64,

    /// Pressure.
    #[serde(rename = "Pressure", deserialize_with = "null_as_default")]
    pub pressure: f64,

    /// Oxidation-reduction potential.
    #[serde(rename = "ORP_REDOX", deserialize_with = "null_as_default")]
    pub orp_redox: f64,

    /// Turbidity.
    #[serde(rename = "Turbidity", deserialize_with = "null_as_default")]
    pub turbidity: f64,

    /// Chloride.
    #[serde(rename = "Chloride", deserialize_with = "null_as_default")]
    pub chloride: f64,

    /// Coliform bacteria counts.
    #[serde(rename = "Coliforms", deserialize_with = "null_as_default")]
    pub coliforms: Coliforms,

    /// Crude oils.
    #[serde(rename = "Crude_Oils", deserialize_with = "null_as_default")]
    pub crude_oils: f64,

    /// Acidity.
    #[serde(rename = "pH", deserialize_with = "null_as_default")]
    pub ph: f64,

    /// Tryptophan-like fluorescence.
    #[serde(rename = "Tryptophan", deserialize_with = "null_as_default")]
    pub tryptophan: f64,

    /// Colored dissolved organic matter.
    #[serde(rename = "CDOM", deserialize_with = "null_as_default")]
    pub cdom: f64,

    /// Water temperature.
    #[serde(rename = "Temperature", deserialize_with = "null_as_default")]
    pub temperature: f64,

    /// Refined oils.
    #[serde(rename = "Refined_Oils", deserialize_with = "null_as_default")]
    pub refined_oils: f64,
}

impl_resource!(WasteWaterData, "waste water");

/// A physical device that hosts sensors.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Device {
    /// Identifier assigned by the storage layer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<DocId>,

    /// Name of the device.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,

    /// Free-form description of the device.
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,

    /// When the device was registered.
    #[serde(deserialize_with = "deserialize_optional_timestamp")]
    pub created_at: Option<Timestamp>,

    /// When the device was last modified.
    #[serde(deserialize_with = "deserialize_optional_timestamp")]
    pub updated_at: Option<Timestamp>,
}

impl_resource!(Device, "device");

/// A sensor attached to a device.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Sensor {
    /// Identifier assigned by the storage layer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<DocId>,

    /// Name of the sensor.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,

    /// Free-form description of the sensor.
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,

    /// Device the sensor belongs to.  Not checked against existing devices.
    #[serde(deserialize_with = "deserialize_optional_docid")]
    pub device_id: Option<DocId>,

    /// When the sensor was registered.
    #[serde(deserialize_with = "deserialize_optional_timestamp")]
    pub created_at: Option<Timestamp>,

    /// When the sensor was last modified.
    #[serde(deserialize_with = "deserialize_optional_timestamp")]
    pub updated_at: Option<Timestamp>,
}

impl_resource!(Sensor, "sensor");
