use std::borrow::Cow;

use wgpu::naga::ShaderStage;

/// Compiles the plane vertex shader (wave displacement + camera transform).
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("plane vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(vertex_source()),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    })
}

/// Compiles the masked crossfade fragment shader.
pub(crate) fn compile_fragment_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("plane crossfade fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(fragment_source()),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    })
}

fn vertex_source() -> String {
    format!("{HEADER}\n{VERTEX_BODY}")
}

fn fragment_source() -> String {
    format!("{HEADER}\n{FRAGMENT_BODY}")
}

/// Shared prologue. The uniform block layout must match `PlaneUniforms` in
/// `gpu/uniforms.rs`.
const HEADER: &str = r"#version 450

layout(std140, set = 0, binding = 0) uniform PlaneUniforms {
    mat4 view_proj;
    vec4 offset;
    vec4 color;
    float transition;
    float time;
    float strength;
    float edge_softness;
    float edge_glow;
} ubo;
";

const VERTEX_BODY: &str = r"layout(location = 0) in vec3 a_position;
layout(location = 1) in vec2 a_uv;
layout(location = 0) out vec2 v_uv;

void main() {
    vec3 pos = a_position;
    float wave = sin(pos.x * 0.35 + ubo.time * 12.0) * cos(pos.y * 0.35 + ubo.time * 9.0);
    pos.z += wave * ubo.strength * 10.0;
    v_uv = a_uv;
    gl_Position = ubo.view_proj * vec4(pos + ubo.offset.xyz, 1.0);
}
";

// Keep in step with `crossfade::wipe_factor`; the endpoints are pinned so
// transition 0 and 1 reproduce the source textures exactly.
const FRAGMENT_BODY: &str = r"layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(set = 1, binding = 0) uniform texture2D from_texture;
layout(set = 1, binding = 1) uniform texture2D to_texture;
layout(set = 1, binding = 2) uniform texture2D mask_texture;
layout(set = 1, binding = 3) uniform sampler repeat_sampler;

float wipe_factor(float mask, float transition, float softness) {
    if (transition <= 0.0) {
        return 0.0;
    }
    if (transition >= 1.0) {
        return 1.0;
    }
    float progress = transition * (1.0 + softness);
    return smoothstep(mask, mask + softness, progress);
}

void main() {
    vec4 from_color = texture(sampler2D(from_texture, repeat_sampler), v_uv);
    vec4 to_color = texture(sampler2D(to_texture, repeat_sampler), v_uv);
    float mask = texture(sampler2D(mask_texture, repeat_sampler), v_uv).r;

    float f = wipe_factor(mask, ubo.transition, ubo.edge_softness);
    vec4 color = mix(from_color, to_color, f);
    float band = 4.0 * f * (1.0 - f);
    color.rgb += ubo.color.rgb * band * ubo.edge_glow;
    outColor = color;
}
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_stages_share_the_uniform_block() {
        for source in [vertex_source(), fragment_source()] {
            assert!(source.starts_with("#version 450"));
            assert!(source.contains("uniform PlaneUniforms"));
            assert_eq!(source.matches("#version").count(), 1);
        }
    }

    #[test]
    fn fragment_binds_three_textures_and_one_sampler() {
        let source = fragment_source();
        for binding in 0..3 {
            assert!(source.contains(&format!("set = 1, binding = {binding}) uniform texture2D")));
        }
        assert!(source.contains("set = 1, binding = 3) uniform sampler repeat_sampler"));
        assert!(source.contains("transition <= 0.0"));
        assert!(source.contains("transition >= 1.0"));
    }

    #[test]
    fn vertex_displaces_by_strength() {
        let source = vertex_source();
        assert!(source.contains("ubo.strength"));
        assert!(source.contains("ubo.view_proj"));
        assert!(source.contains("location = 1) in vec2 a_uv"));
    }
}
