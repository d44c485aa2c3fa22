// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Static vocabulary tables mapping raw index values to display labels.
//!
//! Both directions are total: a value with no mapping passes through
//! unchanged, so an unexpected raw value in the index never breaks display
//! and an unknown label never breaks filtering.

use once_cell::sync::Lazy;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vocabulary {
    Resources,
    ContractTypes,
    DocumentTypes,
}

/// Raw resource values as stored in the index, with their display labels.
const RESOURCES: &[(&str, &str)] = &[
    ("coal", "Нүүрс"),
    ("gold", "Алт"),
    ("copper", "Зэс"),
    ("silver", "Мөнгө"),
    ("iron ore", "Төмрийн хүдэр"),
    ("fluorspar", "Хайлуур жонш"),
    ("uranium", "Уран"),
    ("zinc", "Цайр"),
    ("lead", "Хар тугалга"),
    ("molybdenum", "Молибден"),
    ("tungsten", "Вольфрам"),
    ("tin", "Цагаан тугалга"),
    ("crude oil", "Газрын тос"),
    ("rare earth elements", "Ховор шороон элемент"),
    ("limestone", "Шохойн чулуу"),
];

const CONTRACT_TYPES: &[(&str, &str)] = &[
    ("production sharing agreement", "Бүтээгдэхүүн хуваах гэрээ"),
    ("investment agreement", "Хөрөнгө оруулалтын гэрээ"),
    ("stability agreement", "Тогтвортой байдлын гэрээ"),
    ("local development agreement", "Орон нутгийн хөгжлийг дэмжих гэрээ"),
    ("exploration agreement", "Хайгуулын гэрээ"),
    ("deposit usage agreement", "Ашиглалтын гэрээ"),
    ("water usage agreement", "Ус ашиглах гэрээ"),
];

const DOCUMENT_TYPES: &[(&str, &str)] = &[
    ("contract", "Гэрээ"),
    ("annex", "Хавсралт"),
    ("amendment", "Нэмэлт, өөрчлөлт"),
    ("environmental impact assessment", "Байгаль орчны нөлөөллийн үнэлгээ"),
    ("feasibility study", "Техник, эдийн засгийн үндэслэл"),
];

struct VocabularyMap {
    display: HashMap<&'static str, &'static str>,
    raw: HashMap<&'static str, &'static str>,
}

impl VocabularyMap {
    fn build(pairs: &'static [(&'static str, &'static str)]) -> Self {
        Self {
            display: pairs.iter().copied().collect(),
            raw: pairs.iter().map(|&(raw, label)| (label, raw)).collect(),
        }
    }
}

static RESOURCES_MAP: Lazy<VocabularyMap> = Lazy::new(|| VocabularyMap::build(RESOURCES));
static CONTRACT_TYPES_MAP: Lazy<VocabularyMap> = Lazy::new(|| VocabularyMap::build(CONTRACT_TYPES));
static DOCUMENT_TYPES_MAP: Lazy<VocabularyMap> = Lazy::new(|| VocabularyMap::build(DOCUMENT_TYPES));

fn table(vocabulary: Vocabulary) -> &'static VocabularyMap {
    match vocabulary {
        Vocabulary::Resources => &RESOURCES_MAP,
        Vocabulary::ContractTypes => &CONTRACT_TYPES_MAP,
        Vocabulary::DocumentTypes => &DOCUMENT_TYPES_MAP,
    }
}

/// Map a raw index value to its display label; unmapped values pass through.
pub fn to_display<'a>(vocabulary: Vocabulary, raw: &'a str) -> &'a str {
    table(vocabulary).display.get(raw).copied().unwrap_or(raw)
}

/// Map a display label back to its raw index value; unmapped labels pass
/// through.
pub fn to_raw<'a>(vocabulary: Vocabulary, label: &'a str) -> &'a str {
    table(vocabulary).raw.get(label).copied().unwrap_or(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lookup() {
        assert_eq!(to_display(Vocabulary::Resources, "coal"), "Нүүрс");
        assert_eq!(to_display(Vocabulary::DocumentTypes, "contract"), "Гэрээ");
    }

    #[test]
    fn test_raw_lookup() {
        assert_eq!(to_raw(Vocabulary::Resources, "Нүүрс"), "coal");
        assert_eq!(
            to_raw(Vocabulary::ContractTypes, "Хайгуулын гэрээ"),
            "exploration agreement"
        );
    }

    #[test]
    fn test_unmapped_values_pass_through() {
        assert_eq!(to_display(Vocabulary::Resources, "unobtainium"), "unobtainium");
        assert_eq!(to_raw(Vocabulary::DocumentTypes, "Протокол"), "Протокол");
    }

    #[test]
    fn test_round_trip_is_idempotent() {
        for vocabulary in [
            Vocabulary::Resources,
            Vocabulary::ContractTypes,
            Vocabulary::DocumentTypes,
        ] {
            for &(raw, label) in match vocabulary {
                Vocabulary::Resources => RESOURCES,
                Vocabulary::ContractTypes => CONTRACT_TYPES,
                Vocabulary::DocumentTypes => DOCUMENT_TYPES,
            } {
                let once = to_raw(vocabulary, label);
                assert_eq!(once, raw);
                let twice = to_raw(vocabulary, to_display(vocabulary, once));
                assert_eq!(once, twice);
            }
        }
    }
}
