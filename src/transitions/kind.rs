use std::fmt;

use crate::transitions::types::{TransitionSubType as S, TransitionType as T};

/// Every slide transition the engine can draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    Fade,
    Wipe,
    Box,
    Diamond,
    Venetian,
    Checkers,
    Wheel,
    Split,
    Bars,
    Oval,
    Plus,
    SimpleDissolve,
    Fan,
    Waterfall,
    Cover,
    Cube,
    Helix,
    Fall,
    TurnAround,
    FlipTiles,
    Venetian3d,
    NewsFlash,
    Dissolve,
}

impl TransitionKind {
    pub const ALL: [Self; 23] = [
        Self::Fade,
        Self::Wipe,
        Self::Box,
        Self::Diamond,
        Self::Venetian,
        Self::Checkers,
        Self::Wheel,
        Self::Split,
        Self::Bars,
        Self::Oval,
        Self::Plus,
        Self::SimpleDissolve,
        Self::Fan,
        Self::Waterfall,
        Self::Cover,
        Self::Cube,
        Self::Helix,
        Self::Fall,
        Self::TurnAround,
        Self::FlipTiles,
        Self::Venetian3d,
        Self::NewsFlash,
        Self::Dissolve,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Fade => "fade",
            Self::Wipe => "wipe",
            Self::Box => "box",
            Self::Diamond => "diamond",
            Self::Venetian => "venetian",
            Self::Checkers => "checkers",
            Self::Wheel => "wheel",
            Self::Split => "split",
            Self::Bars => "bars",
            Self::Oval => "oval",
            Self::Plus => "plus",
            Self::SimpleDissolve => "simple-dissolve",
            Self::Fan => "fan",
            Self::Waterfall => "waterfall",
            Self::Cover => "cover",
            Self::Cube => "cube",
            Self::Helix => "helix",
            Self::Fall => "fall",
            Self::TurnAround => "turn-around",
            Self::FlipTiles => "flip-tiles",
            Self::Venetian3d => "venetian-3d",
            Self::NewsFlash => "news-flash",
            Self::Dissolve => "dissolve",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let key = name.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL.into_iter().find(|k| k.name() == key)
    }

    /// Mesh transitions render through primitives; the rest splice a fragment shader.
    pub fn is_3d(self) -> bool {
        matches!(
            self,
            Self::Cover
                | Self::Cube
                | Self::Helix
                | Self::Fall
                | Self::TurnAround
                | Self::FlipTiles
                | Self::Venetian3d
                | Self::NewsFlash
                | Self::Dissolve
        )
    }

    pub fn default_subtype(self) -> S {
        match self {
            Self::Fade => S::CrossFade,
            Self::Wipe => S::LeftToRight,
            Self::Box => S::Rectangle,
            Self::Diamond => S::Diamond,
            Self::Venetian => S::Horizontal,
            Self::Checkers => S::Down,
            Self::Wheel => S::OneBlade,
            Self::Split => S::Vertical,
            Self::Bars => S::Vertical,
            Self::Oval => S::Circle,
            Self::Plus => S::CornersIn,
            Self::Fan => S::CenterTop,
            Self::Waterfall => S::HorizontalLeft,
            Self::Cover => S::FromLeft,
            Self::Cube => S::Across,
            Self::Venetian3d => S::BottomRight,
            Self::NewsFlash => S::RotateIn,
            Self::SimpleDissolve
            | Self::Helix
            | Self::Fall
            | Self::TurnAround
            | Self::FlipTiles
            | Self::Dissolve => S::Default,
        }
    }

    pub fn supports(self, subtype: S) -> bool {
        let supported: &[S] = match self {
            Self::Fade => &[S::CrossFade, S::FadeOverColor, S::FadeToColor, S::FadeFromColor],
            Self::Wipe => &[S::LeftToRight, S::TopToBottom],
            Self::Box => &[S::Rectangle, S::TopLeft, S::TopRight, S::BottomLeft, S::BottomRight],
            Self::Venetian | Self::Split | Self::Bars => &[S::Horizontal, S::Vertical],
            Self::Checkers => &[S::Down, S::Across],
            Self::Wheel => &[
                S::OneBlade,
                S::TwoBladeVertical,
                S::TwoBladeHorizontal,
                S::ThreeBlade,
                S::FourBlade,
                S::EightBlade,
            ],
            Self::Oval => &[S::Circle, S::Horizontal, S::Vertical],
            Self::Plus => &[S::CornersIn, S::CornersOut],
            Self::Fan => &[S::CenterTop, S::CenterRight, S::TopCenter],
            Self::Waterfall => &[S::HorizontalLeft, S::HorizontalRight],
            Self::Cover => &[
                S::FromLeft,
                S::FromTop,
                S::FromRight,
                S::FromBottom,
                S::FromTopLeft,
                S::FromTopRight,
                S::FromBottomLeft,
                S::FromBottomRight,
            ],
            Self::Cube => &[S::Across, S::CornersIn, S::CornersOut],
            Self::Venetian3d => &[S::BottomRight, S::TopCenter],
            Self::Diamond => &[S::Diamond],
            Self::NewsFlash => &[S::RotateIn],
            Self::SimpleDissolve
            | Self::Helix
            | Self::Fall
            | Self::TurnAround
            | Self::FlipTiles
            | Self::Dissolve => &[S::Default],
        };
        supported.contains(&subtype)
    }

    /// Map a document transition onto a kind.
    ///
    /// Subtypes the kind does not know fall back to its default subtype; a type with no
    /// counterpart yields `None`.
    pub fn resolve(ty: T, subtype: S) -> Option<ResolvedTransition> {
        let mipmaps = mipmaps_enabled(ty, subtype);
        let (kind, subtype, push) = match ty {
            T::Fade => (Self::Fade, subtype, false),
            T::BarWipe => (Self::Wipe, subtype, false),
            T::BoxWipe => (Self::Box, subtype, false),
            T::IrisWipe => match subtype {
                S::Diamond => (Self::Diamond, subtype, false),
                _ => (Self::Box, S::Rectangle, false),
            },
            T::DiagonalWipe => (Self::Box, subtype, false),
            T::BlindsWipe => (Self::Venetian, subtype, false),
            T::CheckerboardWipe => (Self::Checkers, subtype, false),
            T::PinWheelWipe => (Self::Wheel, subtype, false),
            T::BarnDoorWipe => (Self::Split, subtype, false),
            T::RandomBarWipe => (Self::Bars, subtype, false),
            T::EllipseWipe => (Self::Oval, subtype, false),
            T::FourBoxWipe => (Self::Plus, subtype, false),
            T::Dissolve => (Self::SimpleDissolve, subtype, false),
            T::FanWipe => (Self::Fan, subtype, false),
            T::ClockWipe => (Self::Fan, S::TopCenter, false),
            T::WaterfallWipe => (Self::Waterfall, subtype, false),
            T::SlideWipe => (Self::Cover, subtype, false),
            T::PushWipe => (Self::Cover, subtype, true),
            T::MiscShapeWipe => match subtype {
                S::LeftToRight => (Self::Fall, S::Default, false),
                S::TopToBottom => (Self::TurnAround, S::Default, false),
                S::CornersIn | S::CornersOut | S::Across => (Self::Cube, subtype, false),
                S::FanOutHorizontal => (Self::Helix, S::Default, false),
                S::BottomRight | S::TopCenter => (Self::Venetian3d, subtype, false),
                S::BottomCenter => (Self::Dissolve, S::Default, false),
                S::TopRight => (Self::FlipTiles, S::Default, false),
                other => {
                    tracing::debug!(subtype = %other, "unknown 3d transition, using cube");
                    (Self::Cube, Self::Cube.default_subtype(), false)
                }
            },
            T::Zoom => match subtype {
                S::RotateIn => (Self::NewsFlash, subtype, false),
                other => {
                    tracing::warn!(subtype = %other, "unsupported zoom transition");
                    return None;
                }
            },
            T::Invalid => return None,
        };

        let subtype = if kind.supports(subtype) {
            subtype
        } else {
            let fallback = kind.default_subtype();
            tracing::debug!(%ty, %subtype, %fallback, "unknown transition subtype, using default");
            fallback
        };

        Some(ResolvedTransition {
            kind,
            subtype,
            push,
            mipmaps,
        })
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedTransition {
    pub kind: TransitionKind,
    pub subtype: S,
    /// Slide wipes that also push the leaving slide out.
    pub push: bool,
    /// Slide textures for this transition want mipmaps.
    pub mipmaps: bool,
}

/// 3D transitions that shrink the slides sample better from mipmapped textures.
pub fn mipmaps_enabled(ty: T, subtype: S) -> bool {
    ty == T::MiscShapeWipe
        && matches!(
            subtype,
            S::CornersOut
                | S::TopToBottom
                | S::LeftToRight
                | S::BottomRight
                | S::BottomLeft
                | S::TopCenter
                | S::CornersIn
                | S::TopLeft
                | S::Circle
                | S::FanOutHorizontal
                | S::Across
                | S::Diamond
                | S::Heart
        )
}

#[cfg(test)]
#[path = "../../tests/unit/transitions/kind.rs"]
mod tests;
