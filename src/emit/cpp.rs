//! C++ header generation.
//!
//! `Constants.hpp` carries the public enumerations (color modes, symbol sets,
//! entities and modifiers). `Schema.hpp` maps every numeric symbol code to a
//! `SymbolLayer` built from `DrawCommand` calls.
//!
//! Style suffixes (`.with_fill`, `.with_stroke`, `.with_stroke_width`) are
//! only written when they differ from the renderer's defaults for the
//! command: paths and circles default to no fill and an icon stroke, text
//! defaults to an icon fill and no stroke.

use indexmap::IndexMap;
use tracing::debug;

use super::{sanitize_identifier, FontEngine, IdentifierRegistry, OutputStyle};
use crate::ast::{
    BBox, ColorToken, Element, Style, SymbolLayer, SymbolSet, TextType, Vec2,
    DEFAULT_STROKE_WIDTH,
};
use crate::taxonomy::Constants;
use crate::SchemaError;

/// Side length of the nominal icon square.
pub const NOMINAL_ICON_SIZE: u32 = 200;

/// `IconType` enumerators, in category order.
const ICON_TYPES: [&str; 3] = ["ENTITY", "MODIFIER_1", "MODIFIER_2"];

// =============================
// Constants.hpp
// =============================

pub fn constants_header(sets: &[SymbolSet], constants: &Constants) -> Result<String, SchemaError> {
    let mut out = String::new();
    out.push_str("#pragma once\n");
    out.push_str("#include <cstdint>\n");
    out.push_str("#include <array>\n\n");
    out.push_str("namespace milsymbol {\n");

    let mut modes = IdentifierRegistry::new();
    let mut lines = Vec::with_capacity(constants.color_modes.len());
    for mode in &constants.color_modes {
        lines.push(format!(
            "\t{}",
            modes.claim(sanitize_identifier(mode), mode.clone())?
        ));
    }
    out.push_str("enum class ColorMode {\n");
    out.push_str(&lines.join(",\n"));
    out.push_str("\n};\n\n");

    let mut set_names = IdentifierRegistry::new();
    let mut lines = vec!["\tUNDEFINED = -1".to_string()];
    let mut identifiers = Vec::with_capacity(sets.len());
    for set in sets {
        let identifier = set_names.claim(
            sanitize_identifier(&set.name),
            format!("{} (set {})", set.name, set.id),
        )?;
        lines.push(format!("\t{} = {}", identifier, set.number));
        identifiers.push(identifier);
    }
    out.push_str("enum class SymbolSet {\n");
    out.push_str(&lines.join(",\n"));
    out.push_str("\n};\n\n");

    out.push_str(&format!(
        "static constexpr int SYMBOL_SET_COUNT = {};\n",
        sets.len()
    ));
    out.push_str(&format!(
        "static constexpr int NOMINAL_ICON_SIZE = {}; /// The default icon size\n\n",
        NOMINAL_ICON_SIZE
    ));
    out.push_str("static constexpr std::array<SymbolSet, SYMBOL_SET_COUNT> SYMBOL_SETS = {\n");
    out.push_str(
        &identifiers
            .iter()
            .map(|id| format!("\tSymbolSet::{}", id))
            .collect::<Vec<_>>()
            .join(",\n"),
    );
    out.push_str("\n};\n\n");

    out.push_str(&code_enum("Entities", sets, |set| &set.icons, |set, layer| {
        sanitize_identifier(&format!("{}_{}", set.name, layer.primary_name()))
    })?);
    out.push_str(&code_enum("Modifier1", sets, |set| &set.m1, |set, layer| {
        format!(
            "{}_M1_{}",
            sanitize_identifier(&set.name),
            sanitize_identifier(layer.primary_name())
        )
    })?);
    out.push_str(&code_enum("Modifier2", sets, |set| &set.m2, |set, layer| {
        format!(
            "{}_M2_{}",
            sanitize_identifier(&set.name),
            sanitize_identifier(layer.primary_name())
        )
    })?);

    out.push_str("}\n");
    Ok(out)
}

/// One `int32_t` enumeration with an enumerator per layer of one category
/// across all sets.
fn code_enum<'s>(
    enum_name: &str,
    sets: &'s [SymbolSet],
    category: impl Fn(&'s SymbolSet) -> &'s IndexMap<String, SymbolLayer>,
    identifier: impl Fn(&SymbolSet, &SymbolLayer) -> String,
) -> Result<String, SchemaError> {
    let mut registry = IdentifierRegistry::new();
    let mut lines = Vec::new();
    for set in sets {
        for layer in category(set).values() {
            let name = registry.claim(
                identifier(set, layer),
                format!("{}:{} ({})", set.id, layer.uid, layer.primary_name()),
            )?;
            lines.push(format!("\t{} = {}", name, symbol_code(set, layer)?));
        }
    }
    Ok(format!(
        "enum {} : int32_t {{\n{}\n}};\n\n",
        enum_name,
        lines.join(",\n")
    ))
}

fn symbol_code(set: &SymbolSet, layer: &SymbolLayer) -> Result<u32, SchemaError> {
    set.code_for(layer).ok_or_else(|| SchemaError::InvalidRecord {
        category: "symbol",
        id: format!("{}:{}", set.id, layer.uid),
        reason: "cannot derive a numeric symbol code".to_string(),
    })
}

// =============================
// Schema.hpp
// =============================

pub fn schema_header(
    sets: &[SymbolSet],
    constants: &Constants,
    style: &OutputStyle,
    font: Option<&dyn FontEngine>,
) -> Result<String, SchemaError> {
    let writer = CommandWriter::new(constants, style, font)?;

    let mut out = String::new();
    out.push_str("#pragma once\n");
    out.push_str("#include \"DrawCommands.hpp\"\n");
    out.push_str("#include \"Constants.hpp\"\n");
    out.push_str("#include \"eternal.hpp\"\n\n");
    out.push_str("namespace milsymbol::_impl {\n");
    out.push_str("enum class IconType {\n\tENTITY = 0,\n\tMODIFIER_1,\n\tMODIFIER_2\n\n};\n");

    out.push_str(
        "static constexpr SymbolLayer get_symbol_layer(SymbolSet symbol_set, int32_t code, IconType symbol_type) {\n",
    );
    for (index, set) in sets.iter().enumerate() {
        debug!("Emitting set {} ({})", set.id, set.name);
        out.push_str(&set_branch(index, set));
        for (type_index, (_, layers)) in set.categories().iter().enumerate() {
            let map_title = format!("{}_MAP", ICON_TYPES[type_index]);
            out.push_str(&type_branch(type_index));
            out.push_str(&format!(
                "\t\t\tconst auto {} = mapbox::eternal::map<int32_t, SymbolLayer>({{\n",
                map_title
            ));
            let mut entries = Vec::with_capacity(layers.len());
            for layer in layers.values() {
                entries.push(format!(
                    "\t\t\t\t{{{}, {}}} /* {} */",
                    symbol_code(set, layer)?,
                    writer.layer(layer)?,
                    comment_safe(layer.primary_name())
                ));
            }
            out.push_str(&entries.join(",\n"));
            out.push_str("\n\t\t\t});\n");
            out.push_str(&format!("\t\t\tauto it = {}.find(code);\n", map_title));
            out.push_str(&format!(
                "\t\t\treturn (it != {}.end() ? it->second : SymbolLayer{{}});\n",
                map_title
            ));
            out.push_str("\t\t}\n");
        }
        out.push_str("\t}\n\n");
    }
    out.push_str("\n\t// Default to nothing\n\treturn {};\n}\n");

    if style.include_enumerator {
        out.push_str(
            "static constexpr std::vector<int32_t> get_available_symbols(SymbolSet symbol_set, IconType symbol_type) {\n",
        );
        for (index, set) in sets.iter().enumerate() {
            out.push_str(&set_branch(index, set));
            for (type_index, (_, layers)) in set.categories().iter().enumerate() {
                out.push_str(&type_branch(type_index));
                let uids = layers
                    .values()
                    .map(|layer| {
                        format!(
                            "{} /*{}*/",
                            layer.uid.parse::<u32>().unwrap_or_default(),
                            comment_safe(layer.primary_name())
                        )
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                out.push_str(&format!("\t\t\treturn {{{}}};\n", uids));
                out.push_str("\t\t}\n");
            }
            out.push_str("\t}\n\n");
        }
        out.push_str("\n\t// Default to nothing\n\treturn {};\n}\n");
    }

    out.push('}');
    Ok(out)
}

fn set_branch(index: usize, set: &SymbolSet) -> String {
    format!(
        "\t{}if (symbol_set == SymbolSet::{}) {{\n",
        if index > 0 { "else " } else { "" },
        sanitize_identifier(&set.name)
    )
}

fn type_branch(type_index: usize) -> String {
    format!(
        "\t\t{}if (symbol_type == IconType::{}) {{\n",
        if type_index > 0 { "else " } else { "" },
        ICON_TYPES[type_index]
    )
}

fn comment_safe(text: &str) -> String {
    text.replace("*/", "* /")
}

// =============================
// Draw commands
// =============================

/// Renders AST nodes as `DrawCommand` expressions.
pub struct CommandWriter<'a> {
    ordering: &'a [String],
    font: Option<&'a dyn FontEngine>,
}

impl<'a> CommandWriter<'a> {
    /// Fails when text-as-path output is requested without a font engine.
    pub fn new(
        constants: &'a Constants,
        style: &OutputStyle,
        font: Option<&'a dyn FontEngine>,
    ) -> Result<Self, SchemaError> {
        if style.use_text_paths && font.is_none() {
            return Err(SchemaError::FontEngine {
                message: "text paths were requested but no font engine was supplied".to_string(),
            });
        }
        Ok(Self {
            ordering: &constants.full_frame_ordering,
            font: if style.use_text_paths { font } else { None },
        })
    }

    pub fn layer(&self, layer: &SymbolLayer) -> Result<String, SchemaError> {
        Ok(format!(
            "SymbolLayer{{{}}}{}",
            self.list(&layer.elements)?,
            if layer.civilian {
                ".with_civilian_override(true)"
            } else {
                ""
            }
        ))
    }

    fn list(&self, elements: &[Element]) -> Result<String, SchemaError> {
        let rendered = elements
            .iter()
            .map(|element| self.element(element))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rendered.join(", "))
    }

    pub fn element(&self, element: &Element) -> Result<String, SchemaError> {
        match element {
            Element::Path { d, bbox, style } => Ok(path_command(d, bbox, style)),
            Element::Circle { pos, radius, style } => Ok(format!(
                "DrawCommand::circle(Vector2{{{}, {}}}, {}){}",
                pos.x,
                pos.y,
                radius,
                shape_suffix(style)
            )),
            Element::Text {
                text,
                pos,
                font_size,
                align,
                text_type,
                style,
            } => match self.font {
                Some(engine) => {
                    let (pos, size) = text_layout(text, *text_type, *pos, *font_size);
                    let d = engine.render_text(text, pos, size, *align)?.join(" ");
                    let style = Style {
                        fill: style.fill,
                        stroke: style.stroke,
                        stroke_width: DEFAULT_STROKE_WIDTH,
                    };
                    Ok(path_command(&d, &BBox::default(), &style))
                }
                None => {
                    let text = quoted(text);
                    let command = match text_type {
                        TextType::Auto => format!("DrawCommand::autotext({})", text),
                        TextType::Modifier1 => format!("DrawCommand::textm1({})", text),
                        TextType::Modifier2 => format!("DrawCommand::textm2({})", text),
                        TextType::Manual => format!(
                            "DrawCommand::text({}, Vector2{{{}, {}}}, {})",
                            text, pos.x, pos.y, font_size
                        ),
                    };
                    Ok(command + &text_suffix(style))
                }
            },
            Element::FullFrame { elements, .. } => {
                let mut buckets = Vec::with_capacity(self.ordering.len());
                for id in self.ordering {
                    let items = elements.get(id).map(Vec::as_slice).unwrap_or_default();
                    buckets.push(format!("{{{}}}", self.list(items)?));
                }
                Ok(format!("DrawCommand::full_frame({})", buckets.join(", ")))
            }
            Element::Translate { delta, items, .. } => Ok(format!(
                "DrawCommand::translate(Vector2{{{}, {}}}, {})",
                delta.x,
                delta.y,
                self.list(items)?
            )),
            Element::Scale { factor, items, .. } => Ok(format!(
                "DrawCommand::scale({}, {})",
                factor,
                self.list(items)?
            )),
        }
    }
}

/// Position and font size used when a text element is drawn as paths.
///
/// Auto and modifier text is laid out in fixed slots with sizes stepped down
/// for longer strings; manual text keeps its own placement.
pub fn text_layout(text: &str, text_type: TextType, pos: Vec2, font_size: f64) -> (Vec2, f64) {
    let len = text.chars().count();
    match text_type {
        TextType::Auto => {
            let (size, y) = match len {
                1 => (45.0, 115.0),
                3 => (35.0, 110.0),
                n if n >= 4 => (32.0, 110.0),
                _ => (42.0, 115.0),
            };
            (Vec2::new(100.0, y), size)
        }
        TextType::Modifier1 => {
            let size = match len {
                3 => 25.0,
                n if n >= 4 => 22.0,
                _ => 30.0,
            };
            (Vec2::new(100.0, 77.0), size)
        }
        TextType::Modifier2 => {
            let (size, y) = match len {
                3 => (25.0, 140.0),
                n if n >= 4 => (22.0, 135.0),
                _ => (30.0, 145.0),
            };
            (Vec2::new(100.0, y), size)
        }
        TextType::Manual => (pos, font_size),
    }
}

fn path_command(d: &str, bbox: &BBox, style: &Style) -> String {
    format!(
        "DrawCommand::path({}, BoundingBox({}, {}, {}, {})){}",
        quoted(d),
        bbox.x,
        bbox.y,
        bbox.width,
        bbox.height,
        shape_suffix(style)
    )
}

/// `ColorType::NONE` for no color, else the upper-cased token.
pub fn color_type(color: Option<ColorToken>) -> String {
    match color {
        Some(token) => format!("ColorType::{}", token.as_str().to_uppercase()),
        None => "ColorType::NONE".to_string(),
    }
}

fn shape_suffix(style: &Style) -> String {
    let mut ret = String::new();
    if style.fill.is_some() {
        ret += &format!(".with_fill({})", color_type(style.fill));
    }
    if style.stroke != Some(ColorToken::Icon) {
        ret += &format!(".with_stroke({})", color_type(style.stroke));
    }
    ret + &stroke_width_suffix(style)
}

fn text_suffix(style: &Style) -> String {
    let mut ret = String::new();
    if style.fill != Some(ColorToken::Icon) {
        ret += &format!(".with_fill({})", color_type(style.fill));
    }
    if style.stroke.is_some() {
        ret += &format!(".with_stroke({})", color_type(style.stroke));
    }
    ret + &stroke_width_suffix(style)
}

fn stroke_width_suffix(style: &Style) -> String {
    if style.stroke.is_some() && style.stroke_width != DEFAULT_STROKE_WIDTH {
        format!(".with_stroke_width({})", style.stroke_width)
    } else {
        String::new()
    }
}

/// A C++ string literal.
fn quoted(text: &str) -> String {
    let mut ret = String::with_capacity(text.len() + 2);
    ret.push('"');
    for c in text.chars() {
        match c {
            '"' => ret.push_str("\\\""),
            '\\' => ret.push_str("\\\\"),
            '\n' => ret.push_str("\\n"),
            c => ret.push(c),
        }
    }
    ret.push('"');
    ret
}
