use super::{FieldShape, FieldSpec};

use FieldShape::*;

/// (label, document key, shape) for every searchable field of the backup.
const BUILTIN: &[(&str, &str, FieldShape)] = &[
    ("Samling", "collection", Composite),
    ("Serie", "series", Text),
    ("Titel", "heading", Text),
    ("Beskrivelse", "description", Text),
    ("Noter", "notes", Text),
    ("Datering fra", "date_from", Text),
    ("Datering til", "date_to", Text),
    ("Indholdstype", "content_types", List),
    ("Ophav", "creators", List),
    ("Kurator", "curators", List),
    ("Stednavne", "locations", List),
    ("Begivenheder", "events", List),
    ("Personer", "people", List),
    ("Organisationer", "organisations", List),
    ("Objekter", "objects", List),
    ("Emneord", "subjects", List),
    ("Ophavsret", "copyright_status", Composite),
    ("Tilgængelighed", "availability", Composite),
    ("Anvendelighed", "usability", Composite),
    ("Registreringsstatus", "registration_status", Composite),
    ("Administrative data", "admin_data", Mapping),
    ("Beskrivelsesdata", "description_data", Mapping),
];

pub(super) fn builtin_fields() -> Vec<FieldSpec> {
    BUILTIN
        .iter()
        .map(|&(label, key, shape)| FieldSpec::new(label, key, shape))
        .collect()
}
