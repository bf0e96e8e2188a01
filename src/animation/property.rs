use std::fmt;

use crate::animation::value::ValueType;

/// Attributes an animation node can target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimatedProperty {
    X,
    Y,
    Width,
    Height,
    Opacity,
    Rotate,
    SkewX,
    SkewY,
    Scale,
    Translate,
    Visibility,
    FillColor,
    LineColor,
    CharColor,
    DimColor,
    FillStyle,
    LineStyle,
}

impl AnimatedProperty {
    pub const ALL: [Self; 17] = [
        Self::X,
        Self::Y,
        Self::Width,
        Self::Height,
        Self::Opacity,
        Self::Rotate,
        Self::SkewX,
        Self::SkewY,
        Self::Scale,
        Self::Translate,
        Self::Visibility,
        Self::FillColor,
        Self::LineColor,
        Self::CharColor,
        Self::DimColor,
        Self::FillStyle,
        Self::LineStyle,
    ];

    /// Case-insensitive lookup of an attribute name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Width => "width",
            Self::Height => "height",
            Self::Opacity => "opacity",
            Self::Rotate => "rotate",
            Self::SkewX => "skewx",
            Self::SkewY => "skewy",
            Self::Scale => "scale",
            Self::Translate => "translate",
            Self::Visibility => "visibility",
            Self::FillColor => "fillcolor",
            Self::LineColor => "linecolor",
            Self::CharColor => "charcolor",
            Self::DimColor => "dimcolor",
            Self::FillStyle => "fillstyle",
            Self::LineStyle => "linestyle",
        }
    }

    pub fn value_type(self) -> ValueType {
        match self {
            Self::X
            | Self::Y
            | Self::Width
            | Self::Height
            | Self::Opacity
            | Self::Rotate
            | Self::SkewX
            | Self::SkewY => ValueType::Number,
            Self::Scale | Self::Translate => ValueType::Tuple,
            Self::Visibility => ValueType::Enum,
            Self::FillColor | Self::LineColor | Self::CharColor | Self::DimColor => {
                ValueType::Color
            }
            Self::FillStyle | Self::LineStyle => ValueType::String,
        }
    }

    /// Transform types accepted by `animateTransform`.
    pub fn is_transform(self) -> bool {
        matches!(
            self,
            Self::Translate | Self::Scale | Self::Rotate | Self::SkewX | Self::SkewY
        )
    }
}

impl fmt::Display for AnimatedProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
