//! Static zone and time slot catalog
//!
//! Global invariants enforced:
//! - Catalog data is immutable once constructed
//! - Zone and slot order is the order they were declared in

use serde::{Deserialize, Serialize};

/// Zone category used as a scoring input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneCategory {
    Urban,
    Highway,
    Rural,
}

impl ZoneCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneCategory::Urban => "Urban",
            ZoneCategory::Highway => "Highway",
            ZoneCategory::Rural => "Rural",
        }
    }
}

/// A named geographic area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub category: ZoneCategory,
}

impl Zone {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: ZoneCategory) -> Self {
        Zone {
            id: id.into(),
            name: name.into(),
            category,
        }
    }
}

/// A selectable time window with the hour fed to the estimator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeSlot {
    pub id: String,
    pub label: String,
    pub hour: i32,
}

impl TimeSlot {
    pub fn new(id: impl Into<String>, label: impl Into<String>, hour: i32) -> Self {
        TimeSlot {
            id: id.into(),
            label: label.into(),
            hour,
        }
    }
}

const BUILTIN_TIME_SLOTS: &[(&str, &str, i32)] = &[
    ("t1", "00:00 - 03:00", 0),
    ("t2", "03:00 - 06:00", 3),
    ("t3", "06:00 - 09:00", 6),
    ("t4", "09:00 - 12:00", 9),
    ("t5", "12:00 - 15:00", 12),
    ("t6", "15:00 - 18:00", 15),
    ("t7", "18:00 - 21:00", 18),
    ("t8", "21:00 - 00:00", 21),
];

const BUILTIN_ZONES: &[(&str, &str, ZoneCategory)] = &[
    ("dhaka", "Dhaka Metro", ZoneCategory::Urban),
    ("hwy-n1", "Dhaka-Ctg Hwy (N1)", ZoneCategory::Highway),
    ("gazipur", "Gazipur Ind. Zone", ZoneCategory::Urban),
    ("chittagong", "Chittagong Port", ZoneCategory::Urban),
    ("hwy-n5", "Dhaka-Bogra Hwy (N5)", ZoneCategory::Highway),
    ("sylhet", "Sylhet Region", ZoneCategory::Rural),
    ("barisal", "Barisal Highways", ZoneCategory::Highway),
    ("khulna", "Khulna Metro", ZoneCategory::Urban),
    ("rajshahi", "Rajshahi City", ZoneCategory::Urban),
    ("mymensingh", "Mymensingh Road", ZoneCategory::Rural),
    ("coxsbazar", "Cox's Bazar Marine Dr", ZoneCategory::Highway),
    ("padma", "Padma Bridge Appr.", ZoneCategory::Highway),
];

/// Built-in list of the eight 3-hour slots covering a day
pub fn builtin_time_slots() -> Vec<TimeSlot> {
    BUILTIN_TIME_SLOTS
        .iter()
        .map(|(id, label, hour)| TimeSlot::new(*id, *label, *hour))
        .collect()
}

/// Built-in list of monitored zones
pub fn builtin_zones() -> Vec<Zone> {
    BUILTIN_ZONES
        .iter()
        .map(|(id, name, category)| Zone::new(*id, *name, *category))
        .collect()
}

/// Immutable zone and slot lists passed into every assessment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    zones: Vec<Zone>,
    time_slots: Vec<TimeSlot>,
}

impl Catalog {
    pub fn new(zones: Vec<Zone>, time_slots: Vec<TimeSlot>) -> Self {
        Catalog { zones, time_slots }
    }

    pub fn builtin() -> Self {
        Catalog::new(builtin_zones(), builtin_time_slots())
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn time_slots(&self) -> &[TimeSlot] {
        &self.time_slots
    }

    pub fn zone(&self, id: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn slot(&self, id: &str) -> Option<&TimeSlot> {
        self.time_slots.iter().find(|s| s.id == id)
    }

    /// First slot whose hour matches exactly
    pub fn slot_for_hour(&self, hour: i32) -> Option<&TimeSlot> {
        self.time_slots.iter().find(|s| s.hour == hour)
    }

    /// Slot selected when nothing else is requested
    pub fn first_slot(&self) -> Option<&TimeSlot> {
        self.time_slots.first()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog::builtin()
    }
}
