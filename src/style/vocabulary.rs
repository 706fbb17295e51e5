use serde::{Deserialize, Serialize};

/// Declares one closed style category: its tokens, the fallback token used
/// by normalization, and the display label for every token.
macro_rules! style_vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident, field = $field:literal, default = $default:ident {
            $($variant:ident => ($token:literal, $label:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const FIELD: &'static str = $field;
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
            pub const DEFAULT: $name = $name::$default;

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $token),+
                }
            }

            pub fn display_label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Exact token lookup. Surrounding whitespace is ignored, case is not.
            pub fn from_token(token: &str) -> Option<Self> {
                match token.trim() {
                    $($token => Some($name::$variant),)+
                    _ => None,
                }
            }

            #[cfg(test)]
            pub fn tokens() -> impl Iterator<Item = &'static str> {
                Self::ALL.iter().map(|value| value.as_str())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::DEFAULT
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

style_vocabulary! {
    /// How far the camera sits from the subject.
    CameraDistance, field = "camera_distance", default = Medium {
        Close => ("close", "클로즈업"),
        Medium => ("medium", "미디엄샷"),
        Far => ("far", "풀샷"),
    }
}

style_vocabulary! {
    CameraAngle, field = "camera_angle", default = Front {
        Front => ("front", "정면 컷"),
        Side => ("side", "측면 컷"),
        Diagonal => ("diagonal", "대각선 컷"),
        Top => ("top", "탑뷰 컷"),
    }
}

style_vocabulary! {
    CropType, field = "crop_type", default = UpperBody {
        FullBody => ("full_body", "전신 컷"),
        UpperBody => ("upper_body", "상반신 컷"),
        ProductOnly => ("product_only", "제품 단독 컷"),
    }
}

style_vocabulary! {
    LightType, field = "light_type", default = Natural {
        Natural => ("natural", "자연광"),
        Studio => ("studio", "스튜디오 조명"),
        Soft => ("soft", "부드러운 조명"),
        Dramatic => ("dramatic", "드라마틱 조명"),
    }
}

style_vocabulary! {
    /// Overall colour temperature and brightness of the shot.
    ToneLevel, field = "tone_level", default = Natural {
        Bright => ("bright", "밝은 톤"),
        Natural => ("natural", "내추럴 톤"),
        Warm => ("warm", "따뜻한 톤"),
        Cool => ("cool", "쿨 톤"),
        Dark => ("dark", "다크 톤"),
    }
}

style_vocabulary! {
    BackgroundType, field = "background_type", default = White {
        White => ("white", "화이트 배경"),
        Gray => ("gray", "그레이 배경"),
        Lifestyle => ("lifestyle", "라이프스타일 배경"),
        Outdoor => ("outdoor", "야외 배경"),
        Studio => ("studio", "스튜디오 배경"),
    }
}
