//! `SIDCConstants.gd`: a GDScript dictionary of every set's entity and
//! modifier names, keyed by numeric set id and uid.

use crate::ast::SymbolSet;

const SYMBOL_SET_NAME_KEY: &str = "SYMBOL_SET_NAME";
const CATEGORY_KEYS: [&str; 3] = ["ENTITIES", "MODIFIER_1", "MODIFIER_2"];

pub fn sidc_constants(sets: &[SymbolSet]) -> String {
    let mut out = String::from("class_name SIDCConstants\n");
    for key in std::iter::once(SYMBOL_SET_NAME_KEY).chain(CATEGORY_KEYS) {
        out.push_str(&format!("const {key}:StringName = &\"{key}\"\n"));
    }

    out.push_str("const SYMBOL_SETS:Dictionary = {\n");
    for (index, set) in sets.iter().enumerate() {
        out.push_str(&format!("\t{}: {{\n", set.number));
        out.push_str(&format!(
            "\t\t{}: {},\n",
            SYMBOL_SET_NAME_KEY,
            gd_string(&set.name)
        ));

        for (category_index, (_, layers)) in set.categories().iter().enumerate() {
            out.push_str(&format!("\t\t{}: {{\n", CATEGORY_KEYS[category_index]));
            let entries = layers
                .values()
                .map(|layer| {
                    let names = layer
                        .names
                        .iter()
                        .map(|name| gd_string(name))
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!(
                        "\t\t\t{}: [{}]",
                        layer.uid.parse::<u32>().unwrap_or_default(),
                        names
                    )
                })
                .collect::<Vec<_>>();
            out.push_str(&entries.join(",\n"));
            out.push('\n');
            let last = category_index == CATEGORY_KEYS.len() - 1;
            out.push_str(if last { "\t\t}\n" } else { "\t\t},\n" });
        }

        out.push_str(if index + 1 == sets.len() { "\t}\n" } else { "\t},\n" });
    }
    out.push('}');
    out
}

fn gd_string(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;
    use crate::ast::SymbolLayer;

    fn layer(uid: &str, names: &[&str]) -> SymbolLayer {
        SymbolLayer {
            uid: uid.to_string(),
            names: names.iter().map(|n| n.to_string()).collect(),
            elements: Vec::new(),
            civilian: false,
        }
    }

    #[test]
    fn test_dictionary_layout() {
        let mut icons = IndexMap::new();
        icons.insert("01".to_string(), layer("01", &["Infantry", "Foot"]));
        let set = SymbolSet {
            id: "10".to_string(),
            number: 10,
            name: "Land unit".to_string(),
            icons,
            m1: IndexMap::new(),
            m2: IndexMap::new(),
        };

        let out = sidc_constants(&[set]);
        assert!(out.starts_with("class_name SIDCConstants\n"));
        assert!(out.contains("const ENTITIES:StringName = &\"ENTITIES\"\n"));
        assert!(out.contains("\t10: {\n\t\tSYMBOL_SET_NAME: \"Land unit\",\n"));
        assert!(out.contains("\t\tENTITIES: {\n\t\t\t1: [\"Infantry\", \"Foot\"]\n\t\t},\n"));
        assert!(out.ends_with("\t\t}\n\t}\n}"));
    }
}
