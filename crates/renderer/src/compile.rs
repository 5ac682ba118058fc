use std::borrow::Cow;

use wgpu::naga::ShaderStage;

/// Compiles the static full-screen quad vertex shader.
pub(crate) fn build_vertex_module(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("lightning vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(VERTEX_SHADER_GLSL),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    })
}

/// Compiles the built-in lightning fragment shader through naga's GLSL frontend.
pub(crate) fn build_fragment_module(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("lightning fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(FRAGMENT_SHADER_GLSL),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    })
}

/// Two-triangle quad covering clip space; positions come from a vertex buffer
/// so the pipeline validates the attribute layout at creation time.
const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 position;

void main() {
    gl_Position = vec4(position, 0.0, 1.0);
}
";

/// Procedural lightning: domain-warped value noise with a `1/|x|` falloff.
///
/// The uniform block layout must match [`LightningUniforms`] in
/// `gpu/uniforms.rs` field for field. `_resolution.xy` carries the stage size
/// and `_resolution.zw` its origin within the surface, so the shader can turn
/// `gl_FragCoord` (surface coordinates) into stage-local ones.
///
/// [`LightningUniforms`]: crate::gpu::uniforms::LightningUniforms
const FRAGMENT_SHADER_GLSL: &str = r"#version 450
layout(location = 0) out vec4 outColor;

#define OCTAVE_COUNT 10

layout(std140, set = 0, binding = 0) uniform StageParams {
    vec4 _resolution;
    float _time;
    float _hue;
    float _xOffset;
    float _speed;
    float _intensity;
    float _size;
    vec2 _padding;
} ubo;

vec3 hsv2rgb(vec3 c) {
    vec3 rgb = clamp(abs(mod(c.x * 6.0 + vec3(0.0, 4.0, 2.0), 6.0) - 3.0) - 1.0, 0.0, 1.0);
    return c.z * mix(vec3(1.0), rgb, c.y);
}

float hash11(float p) {
    p = fract(p * 0.1031);
    p *= p + 33.33;
    p *= p + p;
    return fract(p);
}

float hash12(vec2 p) {
    vec3 p3 = fract(vec3(p.xyx) * 0.1031);
    p3 += dot(p3, p3.yzx + 33.33);
    return fract((p3.x + p3.y) * p3.z);
}

mat2 rotate2d(float theta) {
    float c = cos(theta);
    float s = sin(theta);
    return mat2(c, -s, s, c);
}

float valueNoise(vec2 p) {
    vec2 ip = floor(p);
    vec2 fp = fract(p);
    float a = hash12(ip);
    float b = hash12(ip + vec2(1.0, 0.0));
    float c = hash12(ip + vec2(0.0, 1.0));
    float d = hash12(ip + vec2(1.0, 1.0));
    vec2 t = smoothstep(vec2(0.0), vec2(1.0), fp);
    return mix(mix(a, b, t.x), mix(c, d, t.x), t.y);
}

float fbm(vec2 p) {
    float value = 0.0;
    float amplitude = 0.5;
    for (int i = 0; i < OCTAVE_COUNT; ++i) {
        value += amplitude * valueNoise(p);
        p *= rotate2d(0.45);
        p *= 2.0;
        amplitude *= 0.5;
    }
    return value;
}

void main() {
    // gl_FragCoord is in surface coordinates with a top-left origin; shift by
    // the stage origin and flip to the bottom-left origin the noise math uses.
    vec2 stageCoord = gl_FragCoord.xy - ubo._resolution.zw;
    vec2 fragCoord = vec2(stageCoord.x, ubo._resolution.y - stageCoord.y);

    vec2 uv = fragCoord / ubo._resolution.xy;
    uv = 2.0 * uv - 1.0;
    uv.x *= ubo._resolution.x / ubo._resolution.y;
    uv.x += ubo._xOffset;

    uv += 2.0 * fbm(uv * ubo._size + 0.8 * ubo._time * ubo._speed) - 1.0;

    float dist = abs(uv.x);
    vec3 base = hsv2rgb(vec3(ubo._hue / 360.0, 0.7, 0.8));
    float flicker = mix(0.0, 0.07, hash11(ubo._time * ubo._speed));
    vec3 color = base * (flicker / dist) * ubo._intensity;
    outColor = vec4(color, 1.0);
}
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_block_fields_are_declared_in_layout_order() {
        let fields = [
            "vec4 _resolution",
            "float _time",
            "float _hue",
            "float _xOffset",
            "float _speed",
            "float _intensity",
            "float _size",
            "vec2 _padding",
        ];
        let mut cursor = 0;
        for field in fields {
            let at = FRAGMENT_SHADER_GLSL[cursor..]
                .find(field)
                .unwrap_or_else(|| panic!("missing uniform field `{field}`"));
            cursor += at + field.len();
        }
    }

    #[test]
    fn fragment_runs_ten_octaves() {
        assert!(FRAGMENT_SHADER_GLSL.contains("#define OCTAVE_COUNT 10"));
    }

    #[test]
    fn vertex_reads_position_attribute() {
        assert!(VERTEX_SHADER_GLSL.contains("layout(location = 0) in vec2 position;"));
    }

    #[test]
    fn both_stages_target_glsl_450() {
        assert!(VERTEX_SHADER_GLSL.starts_with("#version 450"));
        assert!(FRAGMENT_SHADER_GLSL.starts_with("#version 450"));
    }
}
