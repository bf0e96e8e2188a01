//! Transition type and subtype names as they appear in slide and node metadata.

use std::fmt;

/// Document strings come as `barWipe`, `BARWIPE` or `bar-wipe`.
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

macro_rules! named_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            /// Case and separator insensitive lookup.
            pub fn parse(s: &str) -> Option<Self> {
                let key = normalize(s);
                Self::ALL.iter().copied().find(|v| v.name() == key)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

named_enum! {
    TransitionType {
        Invalid => "invalid",
        BarWipe => "barwipe",
        BoxWipe => "boxwipe",
        FourBoxWipe => "fourboxwipe",
        BarnDoorWipe => "barndoorwipe",
        DiagonalWipe => "diagonalwipe",
        IrisWipe => "iriswipe",
        EllipseWipe => "ellipsewipe",
        MiscShapeWipe => "miscshapewipe",
        ClockWipe => "clockwipe",
        PinWheelWipe => "pinwheelwipe",
        FanWipe => "fanwipe",
        WaterfallWipe => "waterfallwipe",
        PushWipe => "pushwipe",
        SlideWipe => "slidewipe",
        Fade => "fade",
        RandomBarWipe => "randombarwipe",
        CheckerboardWipe => "checkerboardwipe",
        Dissolve => "dissolve",
        BlindsWipe => "blindswipe",
        Zoom => "zoom",
    }
}

named_enum! {
    TransitionSubType {
        Default => "default",
        LeftToRight => "lefttoright",
        TopToBottom => "toptobottom",
        TopLeft => "topleft",
        TopRight => "topright",
        BottomRight => "bottomright",
        BottomLeft => "bottomleft",
        TopCenter => "topcenter",
        RightCenter => "rightcenter",
        BottomCenter => "bottomcenter",
        LeftCenter => "leftcenter",
        CornersIn => "cornersin",
        CornersOut => "cornersout",
        Vertical => "vertical",
        Horizontal => "horizontal",
        Diamond => "diamond",
        Circle => "circle",
        Rectangle => "rectangle",
        Heart => "heart",
        CenterTop => "centertop",
        CenterRight => "centerright",
        OneBlade => "oneblade",
        TwoBladeVertical => "twobladevertical",
        TwoBladeHorizontal => "twobladehorizontal",
        ThreeBlade => "threeblade",
        FourBlade => "fourblade",
        EightBlade => "eightblade",
        FromLeft => "fromleft",
        FromTop => "fromtop",
        FromRight => "fromright",
        FromBottom => "frombottom",
        FromTopLeft => "fromtopleft",
        FromTopRight => "fromtopright",
        FromBottomLeft => "frombottomleft",
        FromBottomRight => "frombottomright",
        CrossFade => "crossfade",
        FadeToColor => "fadetocolor",
        FadeFromColor => "fadefromcolor",
        FadeOverColor => "fadeovercolor",
        Down => "down",
        Across => "across",
        HorizontalLeft => "horizontalleft",
        HorizontalRight => "horizontalright",
        FanOutHorizontal => "fanouthorizontal",
        CombHorizontal => "combhorizontal",
        CombVertical => "combvertical",
        RotateIn => "rotatein",
        RotateOut => "rotateout",
    }
}

impl Default for TransitionType {
    fn default() -> Self {
        Self::Invalid
    }
}

impl Default for TransitionSubType {
    fn default() -> Self {
        Self::Default
    }
}
