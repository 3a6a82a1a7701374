//!
//! Recursive-descent compilation of one icon's JSON into drawing commands.
//!
//! ## Dispatch
//!
//! An element object is classified by the first recognized key present, in
//! this order: `text`, `textm1`, `textm2`, `d`, `r`, `icon`, `translate`,
//! `scale`. An object with none of them is a full frame, whose keys must be
//! base affiliation names.
//!
//! ## Aliases
//!
//! `{"icon": "name"}` splices in the elements of another entry of the same
//! category. The aliased entry is compiled afresh at every use site, so each
//! site owns an independent copy and style overrides on one site never reach
//! another.
//!
//! ## Error Handling
//!
//! Any failure aborts the whole compile; there is no partial element list.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::trace;

use crate::ast::{
    Align, BBox, ColorToken, Element, Style, TextType, Vec2, DEFAULT_FONT_SIZE, ICON_CENTER,
};
use crate::taxonomy::Constants;
use crate::{shape_err, SchemaError};

/// Keys that override an element's style.
pub const STYLE_KEYS: [&str; 3] = ["fill", "stroke", "strokewidth"];

/// The structural kind of an element object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementShape {
    Text,
    TextM1,
    TextM2,
    Path,
    Circle,
    Alias,
    Translate,
    Scale,
    FullFrame,
}

/// Recognized keys in dispatch precedence order.
const PRECEDENCE: [(&str, ElementShape); 8] = [
    ("text", ElementShape::Text),
    ("textm1", ElementShape::TextM1),
    ("textm2", ElementShape::TextM2),
    ("d", ElementShape::Path),
    ("r", ElementShape::Circle),
    ("icon", ElementShape::Alias),
    ("translate", ElementShape::Translate),
    ("scale", ElementShape::Scale),
];

impl ElementShape {
    /// Classifies an element object by the first recognized key it carries.
    pub fn classify(item: &Map<String, Value>) -> Self {
        PRECEDENCE
            .iter()
            .find(|(key, _)| item.contains_key(*key))
            .map(|(_, shape)| *shape)
            .unwrap_or(ElementShape::FullFrame)
    }
}

/// Compiles element JSON against the entries of one category block.
pub struct ElementCompiler<'a> {
    siblings: &'a Map<String, Value>,
    constants: &'a Constants,
    affiliation_names: IndexMap<&'a str, &'a str>,
    /// Entries currently being expanded, outermost first
    expanding: Vec<String>,
}

impl<'a> ElementCompiler<'a> {
    pub fn new(siblings: &'a Map<String, Value>, constants: &'a Constants) -> Self {
        Self {
            siblings,
            constants,
            affiliation_names: constants.base_affiliation_names(),
            expanding: Vec::new(),
        }
    }

    /// Marks `uid` as the entry being compiled so an alias back to it is
    /// reported as a cycle.
    pub fn with_root(mut self, uid: &str) -> Self {
        self.expanding.push(uid.to_string());
        self
    }

    /// Compiles an entry's `icon` value, which must be a list of elements.
    pub fn compile_icon_list(&mut self, icon: &Value) -> Result<Vec<Element>, SchemaError> {
        let items = icon
            .as_array()
            .ok_or_else(|| shape_err!("icons must be lists, found {}", icon))?;
        let mut elements = Vec::with_capacity(items.len());
        for item in items {
            elements.extend(self.compile(item)?);
        }
        Ok(elements)
    }

    /// Compiles one element object. Returns a list because aliases expand to
    /// the aliased entry's whole element list.
    pub fn compile(&mut self, item: &Value) -> Result<Vec<Element>, SchemaError> {
        let obj = item
            .as_object()
            .ok_or_else(|| shape_err!("element must be an object, found {}", item))?;
        if obj.is_empty() {
            return Err(shape_err!("element has no keys"));
        }

        let shape = ElementShape::classify(obj);
        trace!(?shape, "compiling element");

        let mut element = match shape {
            ElementShape::Text => text_element(obj)?,
            ElementShape::TextM1 => slot_text(obj, "textm1", TextType::Modifier1)?,
            ElementShape::TextM2 => slot_text(obj, "textm2", TextType::Modifier2)?,
            ElementShape::Path => path_element(obj)?,
            ElementShape::Circle => circle_element(obj)?,
            ElementShape::Alias => return self.expand_alias(obj),
            ElementShape::Translate => Element::Translate {
                delta: vec2(&obj["translate"], "translate")?,
                items: Vec::new(),
                style: Style::outline(),
            },
            ElementShape::Scale => Element::Scale {
                factor: number(&obj["scale"], "scale")?,
                items: Vec::new(),
                style: Style::outline(),
            },
            ElementShape::FullFrame => self.full_frame(obj)?,
        };

        if let Some(children) = element.items_mut() {
            let raw = obj
                .get("items")
                .and_then(Value::as_array)
                .ok_or_else(|| shape_err!("transform needs an `items` list"))?;
            for sub in raw {
                children.extend(self.compile(sub)?);
            }
        }

        parse_basics(obj, element.style_mut())?;
        Ok(vec![element])
    }

    fn expand_alias(&mut self, obj: &Map<String, Value>) -> Result<Vec<Element>, SchemaError> {
        let name = obj["icon"]
            .as_str()
            .ok_or_else(|| shape_err!("icon alias must be a string, found {}", obj["icon"]))?;

        if self.expanding.iter().any(|entry| entry == name) {
            let mut chain = self.expanding.clone();
            chain.push(name.to_string());
            return Err(SchemaError::AliasCycle { chain });
        }

        let icon = self
            .siblings
            .get(name)
            .and_then(|entry| entry.get("icon"))
            .ok_or_else(|| SchemaError::UnknownAlias {
                name: name.to_string(),
            })?;

        self.expanding.push(name.to_string());
        let expanded = self.compile_icon_list(icon);
        self.expanding.pop();

        let mut elements = expanded?;
        if elements.is_empty() {
            return Err(SchemaError::EmptyAlias {
                name: name.to_string(),
            });
        }
        if STYLE_KEYS.iter().any(|key| obj.contains_key(*key)) {
            for element in &mut elements {
                parse_basics(obj, element.style_mut())?;
            }
        }
        Ok(elements)
    }

    fn full_frame(&mut self, obj: &Map<String, Value>) -> Result<Element, SchemaError> {
        let constants = self.constants;
        let mut elements: IndexMap<String, Vec<Element>> = constants
            .full_frame_ordering
            .iter()
            .map(|id| (id.clone(), Vec::new()))
            .collect();
        let mut filled: Vec<&str> = Vec::new();

        for (key, value) in obj {
            let id: &str = self
                .affiliation_names
                .get(key.as_str())
                .copied()
                .ok_or_else(|| shape_err!("unrecognized full-frame affiliation \"{}\"", key))?;
            let items = value
                .as_array()
                .ok_or_else(|| shape_err!("full-frame entry \"{}\" must be a list", key))?;

            let mut compiled = Vec::new();
            for sub in items {
                compiled.extend(self.compile(sub)?);
            }
            if let Some(bucket) = elements.get_mut(id) {
                bucket.extend(compiled);
            }
            filled.push(id);
        }

        for affiliation in constants.full_frame_affiliations() {
            if !filled.contains(&affiliation.id_code.as_str()) {
                return Err(shape_err!(
                    "full-frame element is missing affiliation \"{}\"",
                    affiliation.primary_name()
                ));
            }
        }

        Ok(Element::FullFrame {
            elements,
            style: Style::outline(),
        })
    }
}

// =============================
// Leaf constructors
// =============================

fn text_element(obj: &Map<String, Value>) -> Result<Element, SchemaError> {
    let mut text_type = TextType::Auto;
    let mut pos = ICON_CENTER;
    let mut font_size = DEFAULT_FONT_SIZE;
    if let Some(raw) = obj.get("pos") {
        pos = vec2(raw, "pos")?;
        text_type = TextType::Manual;
    }
    if let Some(raw) = obj.get("fontsize") {
        font_size = number(raw, "fontsize")?;
        text_type = TextType::Manual;
    }
    Ok(Element::Text {
        text: string(&obj["text"], "text")?,
        pos,
        font_size,
        align: align(obj)?,
        text_type,
        style: Style::glyph(),
    })
}

fn slot_text(
    obj: &Map<String, Value>,
    key: &str,
    text_type: TextType,
) -> Result<Element, SchemaError> {
    Ok(Element::Text {
        text: string(&obj[key], key)?,
        pos: ICON_CENTER,
        font_size: DEFAULT_FONT_SIZE,
        align: align(obj)?,
        text_type,
        style: Style::glyph(),
    })
}

fn path_element(obj: &Map<String, Value>) -> Result<Element, SchemaError> {
    let bbox = match obj.get("bbox") {
        Some(raw) => {
            let [x, y, width, height] = numbers::<4>(raw, "bbox")?;
            BBox::new(x, y, width, height)
        }
        None => BBox::default(),
    };
    Ok(Element::Path {
        d: string(&obj["d"], "d")?,
        bbox,
        style: Style::outline(),
    })
}

fn circle_element(obj: &Map<String, Value>) -> Result<Element, SchemaError> {
    let pos = obj
        .get("pos")
        .ok_or_else(|| shape_err!("circle needs a `pos`"))?;
    Ok(Element::Circle {
        pos: vec2(pos, "pos")?,
        radius: number(&obj["r"], "r")?,
        style: Style::outline(),
    })
}

// =============================
// Style
// =============================

/// Applies the `fill`, `stroke` and `strokewidth` keys of `obj` over `style`.
pub fn parse_basics(obj: &Map<String, Value>, style: &mut Style) -> Result<(), SchemaError> {
    if let Some(raw) = obj.get("fill") {
        style.fill = parse_color(raw)?;
    }
    if let Some(raw) = obj.get("stroke") {
        style.stroke = parse_color(raw)?;
    }
    if let Some(raw) = obj.get("strokewidth") {
        style.stroke_width = number(raw, "strokewidth")?;
    }
    Ok(())
}

/// `true` is the icon color, `false` and `"none"` are no color, anything else
/// must name a color token.
pub fn parse_color(raw: &Value) -> Result<Option<ColorToken>, SchemaError> {
    let bad = || SchemaError::BadColor {
        token: raw.to_string(),
    };
    match raw {
        Value::Bool(true) => Ok(Some(ColorToken::Icon)),
        Value::Bool(false) => Ok(None),
        Value::String(s) if s.eq_ignore_ascii_case("none") => Ok(None),
        Value::String(s) => s.parse().map(Some).map_err(|_| bad()),
        _ => Err(bad()),
    }
}

// =============================
// Value helpers
// =============================

fn string(raw: &Value, field: &str) -> Result<String, SchemaError> {
    raw.as_str()
        .map(str::to_string)
        .ok_or_else(|| shape_err!("`{}` must be a string, found {}", field, raw))
}

/// Accepts JSON numbers and numeric strings.
fn number(raw: &Value, field: &str) -> Result<f64, SchemaError> {
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| shape_err!("`{}` must be a number, found {}", field, raw))
}

fn numbers<const N: usize>(raw: &Value, field: &str) -> Result<[f64; N], SchemaError> {
    let list = raw
        .as_array()
        .filter(|list| list.len() == N)
        .ok_or_else(|| shape_err!("`{}` must be a list of {} numbers, found {}", field, N, raw))?;
    let mut ret = [0.0; N];
    for (slot, value) in ret.iter_mut().zip(list) {
        *slot = number(value, field)?;
    }
    Ok(ret)
}

fn vec2(raw: &Value, field: &str) -> Result<Vec2, SchemaError> {
    let [x, y] = numbers::<2>(raw, field)?;
    Ok(Vec2::new(x, y))
}

fn align(obj: &Map<String, Value>) -> Result<Align, SchemaError> {
    match obj.get("align").map(|raw| (raw, raw.as_str())) {
        None => Ok(Align::default()),
        Some((_, Some("left"))) => Ok(Align::Left),
        Some((_, Some("middle"))) => Ok(Align::Middle),
        Some((_, Some("right"))) => Ok(Align::Right),
        Some((raw, _)) => Err(shape_err!(
            "`align` must be left, middle or right, found {}",
            raw
        )),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_precedence_prefers_text_over_path() {
        let obj = json!({"d": "M0,0", "text": "A", "icon": "x"});
        assert_eq!(
            ElementShape::classify(obj.as_object().unwrap()),
            ElementShape::Text
        );
        let obj = json!({"friend": [], "hostile": []});
        assert_eq!(
            ElementShape::classify(obj.as_object().unwrap()),
            ElementShape::FullFrame
        );
    }

    #[test]
    fn test_parse_color_variants() {
        assert_eq!(parse_color(&json!(true)).unwrap(), Some(ColorToken::Icon));
        assert_eq!(parse_color(&json!(false)).unwrap(), None);
        assert_eq!(parse_color(&json!("None")).unwrap(), None);
        assert_eq!(parse_color(&json!("WHITE")).unwrap(), Some(ColorToken::White));
        assert!(matches!(
            parse_color(&json!("purple")),
            Err(SchemaError::BadColor { .. })
        ));
        assert!(matches!(
            parse_color(&json!(3)),
            Err(SchemaError::BadColor { .. })
        ));
    }

    #[test]
    fn test_parse_basics_overrides_defaults() {
        let obj = json!({"fill": "icon_fill", "stroke": false, "strokewidth": "2.5"});
        let mut style = Style::outline();
        parse_basics(obj.as_object().unwrap(), &mut style).unwrap();
        assert_eq!(style.fill, Some(ColorToken::IconFill));
        assert_eq!(style.stroke, None);
        assert_eq!(style.stroke_width, 2.5);
    }

    #[test]
    fn test_numbers_require_exact_length() {
        assert!(numbers::<2>(&json!([1, 2]), "pos").is_ok());
        assert!(numbers::<2>(&json!([1, 2, 3]), "pos").is_err());
        assert!(numbers::<4>(&json!("1 2 3 4"), "bbox").is_err());
    }

    #[test]
    fn test_align_values() {
        let obj = json!({"align": "left"});
        assert_eq!(align(obj.as_object().unwrap()).unwrap(), Align::Left);
        let obj = json!({"align": "center"});
        assert!(align(obj.as_object().unwrap()).is_err());
    }
}
