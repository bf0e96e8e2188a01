use crate::animation::color::{AnimColor, HslColor, RgbColor, parse_color};
use crate::expression::{ExprEnv, evaluate};

/// Value type of an animatable attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    Number,
    Tuple,
    Color,
    Enum,
    String,
    Bool,
}

impl ValueType {
    /// Whether values of this type can be interpolated and accumulated.
    pub fn is_interpolable(self) -> bool {
        matches!(self, Self::Number | Self::Tuple | Self::Color)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorSpace {
    #[default]
    Rgb,
    Hsl,
}

/// A value flowing from an activity into an animated element.
#[derive(Clone, Debug, PartialEq)]
pub enum AnimValue {
    Number(f64),
    Tuple([f64; 2]),
    Color(AnimColor),
    Enum(String),
    String(String),
    Bool(bool),
}

impl AnimValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Number(_) => ValueType::Number,
            Self::Tuple(_) => ValueType::Tuple,
            Self::Color(_) => ValueType::Color,
            Self::Enum(_) => ValueType::Enum,
            Self::String(_) => ValueType::String,
            Self::Bool(_) => ValueType::Bool,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<[f64; 2]> {
        match self {
            Self::Tuple(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<RgbColor> {
        match self {
            Self::Color(c) => Some(c.to_rgb()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Enum(s) | Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Sum for accumulation. Non-numeric types keep the left operand.
    pub fn add(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => Self::Number(a + b),
            (Self::Tuple(a), Self::Tuple(b)) => Self::Tuple([a[0] + b[0], a[1] + b[1]]),
            (Self::Color(a), Self::Color(b)) => Self::Color(a.add(*b)),
            _ => self.clone(),
        }
    }

    /// Scale by `k`. Non-numeric types are returned unchanged.
    pub fn scale(&self, k: f64) -> Self {
        match self {
            Self::Number(v) => Self::Number(k * v),
            Self::Tuple([a, b]) => Self::Tuple([k * a, k * b]),
            Self::Color(c) => Self::Color(c.scale(k)),
            other => other.clone(),
        }
    }

    /// Parse an attribute string into a value of type `ty`.
    ///
    /// Numbers and tuple components are expressions over `env`.
    pub fn parse(ty: ValueType, s: &str, env: &ExprEnv) -> Option<Self> {
        match ty {
            ValueType::Number => evaluate(s, env).ok().map(Self::Number),
            ValueType::Bool => Some(Self::Bool(s.trim() == "true")),
            ValueType::String => Some(Self::String(s.to_owned())),
            ValueType::Enum => Some(Self::Enum(s.trim().to_owned())),
            ValueType::Color => parse_color(s).map(|c| Self::Color(AnimColor::Rgb(c))),
            ValueType::Tuple => {
                let mut parts = s.split(',');
                let a = evaluate(parts.next()?, env).ok()?;
                let b = evaluate(parts.next()?, env).ok()?;
                if parts.next().is_some() {
                    return None;
                }
                Some(Self::Tuple([a, b]))
            }
        }
    }
}

/// Interpolation strategy for one value type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpolator {
    Number,
    Tuple,
    Rgb,
    Hsl { counter_clockwise: bool },
}

impl Interpolator {
    /// `None` for value types that cannot be interpolated.
    pub fn for_type(ty: ValueType, space: ColorSpace, counter_clockwise: bool) -> Option<Self> {
        match ty {
            ValueType::Number => Some(Self::Number),
            ValueType::Tuple => Some(Self::Tuple),
            ValueType::Color => Some(match space {
                ColorSpace::Rgb => Self::Rgb,
                ColorSpace::Hsl => Self::Hsl { counter_clockwise },
            }),
            ValueType::Enum | ValueType::String | ValueType::Bool => None,
        }
    }

    pub fn interpolate(self, from: &AnimValue, to: &AnimValue, t: f64) -> AnimValue {
        let s = 1.0 - t;
        match (self, from, to) {
            (Self::Number, AnimValue::Number(a), AnimValue::Number(b)) => {
                AnimValue::Number(s * a + t * b)
            }
            (Self::Tuple, AnimValue::Tuple(a), AnimValue::Tuple(b)) => {
                AnimValue::Tuple([s * a[0] + t * b[0], s * a[1] + t * b[1]])
            }
            (Self::Rgb, AnimValue::Color(a), AnimValue::Color(b)) => AnimValue::Color(
                AnimColor::Rgb(RgbColor::interpolate(a.to_rgb(), b.to_rgb(), t)),
            ),
            (Self::Hsl { counter_clockwise }, AnimValue::Color(a), AnimValue::Color(b)) => {
                AnimValue::Color(AnimColor::Hsl(HslColor::interpolate(
                    a.to_hsl(),
                    b.to_hsl(),
                    t,
                    counter_clockwise,
                )))
            }
            _ => {
                tracing::warn!(?from, ?to, "interpolation between mismatched values");
                if t < 1.0 { from.clone() } else { to.clone() }
            }
        }
    }
}
