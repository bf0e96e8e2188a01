//! GLSL sources and the `{{name}}` template used to assemble them.

use crate::foundation::error::{SlideShowError, SlideShowResult};

/// Shader source with named `{{placeholder}}` slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShaderTemplate {
    source: &'static str,
}

impl ShaderTemplate {
    pub const fn new(source: &'static str) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &'static str {
        self.source
    }

    /// Placeholder names in order of first appearance.
    pub fn placeholders(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        let mut rest = self.source;
        while let Some(start) = rest.find("{{") {
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                break;
            };
            let name = after[..end].trim();
            if !names.contains(&name) {
                names.push(name);
            }
            rest = &after[end + 2..];
        }
        names
    }

    /// Substitute every placeholder; fails if one is left without a value.
    pub fn render(&self, values: &[(&str, &str)]) -> SlideShowResult<String> {
        let mut out = String::with_capacity(self.source.len());
        let mut rest = self.source;
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after
                .find("}}")
                .ok_or_else(|| SlideShowError::render("unterminated shader placeholder"))?;
            let name = after[..end].trim();
            let value = values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| *value)
                .ok_or_else(|| {
                    SlideShowError::render(format!("unresolved shader placeholder '{name}'"))
                })?;
            out.push_str(value);
            rest = &after[end + 2..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

pub const VERTEX_2D: &str = r#"#version 300 es
in vec4 a_position;
in vec2 a_texCoord;
out vec2 v_texCoord;

void main() {
    gl_Position = a_position;
    v_texCoord = a_texCoord;
}
"#;

/// Fragment shader shared by every mask transition.
pub const MASK_FRAGMENT: ShaderTemplate = ShaderTemplate::new(
    r#"#version 300 es
precision mediump float;

uniform sampler2D leavingSlideTexture;
uniform sampler2D enteringSlideTexture;
uniform float time;

in vec2 v_texCoord;
out vec4 outColor;

float hash12(vec2 p) {
    return fract(sin(dot(p, vec2(12.9898, 78.233))) * 43758.5453);
}

{{mask_function}}

void main() {
    vec2 uv = v_texCoord;
    float mask = getMaskValue(uv, time);
    vec4 color0 = texture(leavingSlideTexture, uv);
    vec4 color1 = texture(enteringSlideTexture, uv);
    outColor = mix(color0, color1, mask);
}
"#,
);

/// `1.0` where the entering slide shows. Forward masks reveal where `distance <= time`.
pub const MASK_FUNCTION: ShaderTemplate = ShaderTemplate::new(
    r#"float getMaskValue(vec2 uv, float time) {
    float d = {{distance}};
    return step({{edge}}, time);
}"#,
);

pub const FADE_FRAGMENT: ShaderTemplate = ShaderTemplate::new(
    r#"#version 300 es
precision mediump float;

uniform sampler2D leavingSlideTexture;
uniform sampler2D enteringSlideTexture;
uniform float time;
uniform vec4 fadeColor;

in vec2 v_texCoord;
out vec4 outColor;

void main() {
    vec4 color0 = texture(leavingSlideTexture, v_texCoord);
    vec4 color1 = texture(enteringSlideTexture, v_texCoord);
    {{blend}}
}
"#,
);

pub const CROSS_FADE_BLEND: &str = "outColor = mix(color0, color1, time);";

pub const FADE_OVER_COLOR_BLEND: &str = "if (time < 0.5) {
        outColor = mix(color0, fadeColor, time * 2.0);
    } else {
        outColor = mix(fadeColor, color1, (time - 0.5) * 2.0);
    }";

pub const VERTEX_3D: &str = r#"#version 300 es
in vec3 a_position;
in vec3 a_normal;
in vec2 a_texCoord;

uniform mat4 u_projectionMatrix;
uniform mat4 u_modelViewMatrix;
uniform mat4 u_sceneTransformMatrix;
uniform mat4 u_primitiveTransformMatrix;

out vec2 v_texturePosition;
out vec3 v_normal;

void main() {
    mat4 modelView = u_modelViewMatrix * u_sceneTransformMatrix * u_primitiveTransformMatrix;
    mat3 normalMatrix = transpose(inverse(mat3(modelView)));
    gl_Position = u_projectionMatrix * modelView * vec4(a_position, 1.0);
    v_texturePosition = a_texCoord;
    v_normal = normalize(normalMatrix * a_normal);
}
"#;

pub const MESH_FRAGMENT: ShaderTemplate = ShaderTemplate::new(
    r#"#version 300 es
precision mediump float;

uniform sampler2D slideTexture;
uniform float time;
{{declarations}}

in vec2 v_texturePosition;
in vec3 v_normal;
out vec4 outColor;

void main() {
    vec3 lightVector = vec3(0.0, 0.0, 1.0);
    float light = max(dot(lightVector, v_normal), 0.0);
    vec4 fragment = texture(slideTexture, v_texturePosition);
    vec4 black = vec4(0.0, 0.0, 0.0, fragment.a);
    {{body}}
}
"#,
);

pub const MESH_LIT_BODY: &str = "outColor = mix(black, fragment, light);";

pub const DISSOLVE_DECLARATIONS: &str = "uniform sampler2D permTexture;
uniform float isEntering;";

/// Noise threshold dissolve: each texel switches slides when the noise drops under `time`.
pub const DISSOLVE_BODY: &str = "float noise = texture(permTexture, v_texturePosition * 8.0).r;
    float shown = isEntering > 0.5 ? step(noise, time) : 1.0 - step(noise, time);
    if (shown < 0.5) {
        discard;
    }
    outColor = mix(black, fragment, light);";
