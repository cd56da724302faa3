use std::fmt;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use crate::device::{BindingLayouts, GraphicsContext, GraphicsError};

use super::Vertex;

const BASIC_COLOR_WGSL: &str = include_str!("shaders/basic_color.wgsl");
const BASIC_TEXTURED_WGSL: &str = include_str!("shaders/basic_textured.wgsl");

/// Pipeline stage a shader is compiled for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Pixel,
    Geometry,
    Hull,
    Domain,
    Compute,
}

impl ShaderStage {
    /// Short profile name used in labels and diagnostics.
    pub fn profile(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vs",
            ShaderStage::Pixel => "ps",
            ShaderStage::Geometry => "gs",
            ShaderStage::Hull => "hs",
            ShaderStage::Domain => "ds",
            ShaderStage::Compute => "cs",
        }
    }

    /// Matching naga stage; `None` for stages wgpu does not expose.
    fn naga_stage(self) -> Option<naga::ShaderStage> {
        match self {
            ShaderStage::Vertex => Some(naga::ShaderStage::Vertex),
            ShaderStage::Pixel => Some(naga::ShaderStage::Fragment),
            ShaderStage::Compute => Some(naga::ShaderStage::Compute),
            ShaderStage::Geometry | ShaderStage::Hull | ShaderStage::Domain => None,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Pixel => "pixel",
            ShaderStage::Geometry => "geometry",
            ShaderStage::Hull => "hull",
            ShaderStage::Domain => "domain",
            ShaderStage::Compute => "compute",
        };
        f.write_str(name)
    }
}

/// A `@location` input consumed by a vertex entry point.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexInput {
    pub location: u32,
    pub kind: naga::ScalarKind,
}

/// A validated WGSL entry point for one stage.
#[derive(Debug, Clone)]
pub struct Shader {
    stage: ShaderStage,
    entry_point: String,
    source: Arc<str>,
    /// Empty for non-vertex stages.
    inputs: Arc<[VertexInput]>,
}

impl Shader {
    /// Parses and validates `source`, checking that `entry_point` exists for
    /// `stage`.
    pub fn compile(
        source: &str,
        entry_point: &str,
        stage: ShaderStage,
    ) -> Result<Self, GraphicsError> {
        let naga_stage = stage
            .naga_stage()
            .ok_or(GraphicsError::UnsupportedStage(stage))?;

        let label = format!("{entry_point} ({})", stage.profile());

        let module = naga::front::wgsl::parse_str(source).map_err(|e| {
            let diagnostic = e.emit_to_string(source);
            log::error!("shader compilation error in {label}:\n{diagnostic}");
            GraphicsError::ShaderCompile {
                label: label.clone(),
                diagnostic,
            }
        })?;

        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::default(),
        )
        .validate(&module)
        .map_err(|e| {
            let diagnostic = e.emit_to_string(source);
            log::error!("shader validation error in {label}:\n{diagnostic}");
            GraphicsError::ShaderCompile {
                label: label.clone(),
                diagnostic,
            }
        })?;

        let Some(ep) = module
            .entry_points
            .iter()
            .find(|ep| ep.name == entry_point && ep.stage == naga_stage)
        else {
            return Err(GraphicsError::MissingEntryPoint {
                entry_point: entry_point.to_string(),
                stage,
            });
        };

        let inputs = if stage == ShaderStage::Vertex {
            vertex_inputs(&module, &ep.function)
        } else {
            Vec::new()
        };

        Ok(Self {
            stage,
            entry_point: entry_point.to_string(),
            source: Arc::from(source),
            inputs: inputs.into(),
        })
    }

    /// Reads a WGSL file and compiles it.
    pub fn load_from_file(
        path: impl AsRef<Path>,
        entry_point: &str,
        stage: ShaderStage,
    ) -> Result<Self, GraphicsError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| GraphicsError::ShaderIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::compile(&source, entry_point, stage)
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Vertex inputs read by the entry point, sorted by location.
    pub fn inputs(&self) -> &[VertexInput] {
        &self.inputs
    }
}

/// Collects `@location` arguments, including those nested in input structs.
fn vertex_inputs(module: &naga::Module, function: &naga::Function) -> Vec<VertexInput> {
    let mut inputs = Vec::new();

    let mut push = |binding: Option<&naga::Binding>, ty: naga::Handle<naga::Type>| {
        let Some(naga::Binding::Location { location, .. }) = binding else {
            return;
        };
        let kind = match module.types[ty].inner {
            naga::TypeInner::Scalar(scalar) | naga::TypeInner::Vector { scalar, .. } => {
                scalar.kind
            }
            _ => return,
        };
        inputs.push(VertexInput {
            location: *location,
            kind,
        });
    };

    for arg in &function.arguments {
        match &module.types[arg.ty].inner {
            naga::TypeInner::Struct { members, .. } if arg.binding.is_none() => {
                for member in members {
                    push(member.binding.as_ref(), member.ty);
                }
            }
            _ => push(arg.binding.as_ref(), arg.ty),
        }
    }

    inputs.sort_by_key(|input| input.location);
    inputs
}

/// Scalar kind a vertex format presents to the shader.
fn format_kind(format: wgpu::VertexFormat) -> naga::ScalarKind {
    use wgpu::VertexFormat as F;

    match format {
        F::Uint8 | F::Uint8x2 | F::Uint8x4 | F::Uint16 | F::Uint16x2 | F::Uint16x4
        | F::Uint32 | F::Uint32x2 | F::Uint32x3 | F::Uint32x4 => naga::ScalarKind::Uint,
        F::Sint8 | F::Sint8x2 | F::Sint8x4 | F::Sint16 | F::Sint16x2 | F::Sint16x4
        | F::Sint32 | F::Sint32x2 | F::Sint32x3 | F::Sint32x4 => naga::ScalarKind::Sint,
        _ => naga::ScalarKind::Float,
    }
}

/// Every input the vertex shader reads needs an attribute of the same
/// scalar kind. Component counts may differ, as wgpu allows.
fn check_inputs(
    vertex: &Shader,
    attributes: &[wgpu::VertexAttribute],
) -> Result<(), GraphicsError> {
    for input in vertex.inputs() {
        let Some(attr) = attributes
            .iter()
            .find(|a| a.shader_location == input.location)
        else {
            return Err(GraphicsError::invalid(format!(
                "`{}` reads location {} but the layout has no attribute for it",
                vertex.entry_point, input.location
            )));
        };

        let provided = format_kind(attr.format);
        if provided != input.kind {
            return Err(GraphicsError::invalid(format!(
                "location {} is {:?} in `{}` but the layout supplies {:?}",
                input.location, input.kind, vertex.entry_point, attr.format
            )));
        }
    }
    Ok(())
}

/// A set of stage shaders plus the vertex input layout that feeds them.
///
/// The GPU pipeline is built lazily on first draw and cached.
pub struct ShaderProgram {
    label: String,
    shaders: Vec<Shader>,
    input_layout: Option<Vec<wgpu::VertexAttribute>>,
    pipeline: OnceLock<ProgramPipeline>,
}

struct ProgramPipeline {
    format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,
}

impl ShaderProgram {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            shaders: Vec::new(),
            input_layout: None,
            pipeline: OnceLock::new(),
        }
    }

    /// Position + color program with a two-attribute layout
    /// (position `Float32x3` at 0, color `Float32x4` at 12).
    pub fn basic_color() -> Result<Self, GraphicsError> {
        let mut program = Self::new("basic color");
        program.add_shader(Shader::compile(BASIC_COLOR_WGSL, "vs_main", ShaderStage::Vertex)?);
        program.add_shader(Shader::compile(BASIC_COLOR_WGSL, "fs_main", ShaderStage::Pixel)?);
        program.create_input_layout(&Vertex::POSITION_COLOR_ATTRIBUTES)?;
        Ok(program)
    }

    /// Samples the slot-0 texture with the vertex UVs.
    pub fn basic_textured() -> Result<Self, GraphicsError> {
        let mut program = Self::new("basic textured");
        program.add_shader(Shader::compile(BASIC_TEXTURED_WGSL, "vs_main", ShaderStage::Vertex)?);
        program.add_shader(Shader::compile(BASIC_TEXTURED_WGSL, "fs_main", ShaderStage::Pixel)?);
        program.create_input_layout(&Vertex::TEXTURED_ATTRIBUTES)?;
        Ok(program)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Adds a stage shader, replacing any shader already set for that stage.
    pub fn add_shader(&mut self, shader: Shader) {
        self.shaders.retain(|s| s.stage != shader.stage);
        self.shaders.push(shader);
        self.pipeline = OnceLock::new();
    }

    pub fn shader(&self, stage: ShaderStage) -> Option<&Shader> {
        self.shaders.iter().find(|s| s.stage == stage)
    }

    pub fn shaders(&self) -> &[Shader] {
        &self.shaders
    }

    /// Describes how [`Vertex`] bytes map to vertex-shader inputs.
    ///
    /// Requires a vertex shader. Every attribute must fit inside the vertex
    /// stride and use a distinct shader location.
    pub fn create_input_layout(
        &mut self,
        attributes: &[wgpu::VertexAttribute],
    ) -> Result<(), GraphicsError> {
        let Some(vertex) = self.shader(ShaderStage::Vertex) else {
            log::error!("program `{}`: input layout without a vertex shader", self.label);
            return Err(GraphicsError::MissingVertexShader);
        };

        for (i, attr) in attributes.iter().enumerate() {
            if attr.offset + attr.format.size() > Vertex::STRIDE {
                return Err(GraphicsError::invalid(format!(
                    "attribute at location {} ({:?} @ {}) exceeds the {}-byte vertex",
                    attr.shader_location,
                    attr.format,
                    attr.offset,
                    Vertex::STRIDE
                )));
            }
            if attributes[..i]
                .iter()
                .any(|a| a.shader_location == attr.shader_location)
            {
                return Err(GraphicsError::invalid(format!(
                    "duplicate shader location {}",
                    attr.shader_location
                )));
            }
        }

        check_inputs(vertex, attributes).inspect_err(|e| {
            log::error!("program `{}`: {e}", self.label);
        })?;

        self.input_layout = Some(attributes.to_vec());
        self.pipeline = OnceLock::new();
        Ok(())
    }

    pub fn input_layout(&self) -> Option<&[wgpu::VertexAttribute]> {
        self.input_layout.as_deref()
    }

    pub fn bind<C>(self: &Arc<Self>, ctx: &mut C)
    where
        C: GraphicsContext + ?Sized,
    {
        ctx.bind_program(self);
    }

    pub fn unbind<C>(&self, ctx: &mut C)
    where
        C: GraphicsContext + ?Sized,
    {
        ctx.unbind_program();
    }

    /// Render pipeline for `format`, built on first request.
    ///
    /// `None` if the program lacks a vertex shader or input layout, or was
    /// already built for another format.
    pub(crate) fn pipeline(
        &self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        layouts: &BindingLayouts,
    ) -> Option<&wgpu::RenderPipeline> {
        let (Some(vertex), Some(attributes)) =
            (self.shader(ShaderStage::Vertex), self.input_layout.as_deref())
        else {
            log::debug!("program `{}` is incomplete; draw skipped", self.label);
            return None;
        };

        // The vertex shader may have been swapped since the layout was set.
        if let Err(e) = check_inputs(vertex, attributes) {
            log::error!("program `{}`: {e}; draw skipped", self.label);
            return None;
        }

        let cached = self.pipeline.get_or_init(|| ProgramPipeline {
            format,
            pipeline: self.build_pipeline(device, format, layouts, vertex, attributes),
        });

        if cached.format != format {
            log::warn!(
                "program `{}` was built for {:?}, not {format:?}",
                self.label,
                cached.format
            );
            return None;
        }

        Some(&cached.pipeline)
    }

    fn build_pipeline(
        &self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        layouts: &BindingLayouts,
        vertex: &Shader,
        attributes: &[wgpu::VertexAttribute],
    ) -> wgpu::RenderPipeline {
        log::debug!("building pipeline for program `{}`", self.label);

        let module_for = |shader: &Shader| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&format!("{} {}", self.label, shader.stage.profile())),
                source: wgpu::ShaderSource::Wgsl(shader.source().into()),
            })
        };

        let vs_module = module_for(vertex);
        let fragment = self
            .shader(ShaderStage::Pixel)
            .map(|shader| (shader, module_for(shader)));

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{} pipeline layout", self.label)),
            bind_group_layouts: &[&layouts.constants, &layouts.texture],
            immediate_size: 0,
        });

        let buffers = [wgpu::VertexBufferLayout {
            array_stride: Vertex::STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        }];

        let targets = [Some(wgpu::ColorTargetState {
            format,
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{} pipeline", self.label)),
            layout: Some(&layout),

            vertex: wgpu::VertexState {
                module: &vs_module,
                entry_point: Some(vertex.entry_point()),
                compilation_options: Default::default(),
                buffers: &buffers,
            },

            fragment: fragment
                .as_ref()
                .map(|(shader, module)| wgpu::FragmentState {
                    module,
                    entry_point: Some(shader.entry_point()),
                    compilation_options: Default::default(),
                    targets: &targets,
                }),

            // Clockwise front faces with back-face culling, no depth buffer.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Cw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }
}

impl fmt::Debug for ShaderProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("label", &self.label)
            .field(
                "stages",
                &self.shaders.iter().map(|s| s.stage).collect::<Vec<_>>(),
            )
            .field("input_layout", &self.input_layout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::recording::{Call, RecordingContext};
    use std::io::Write;

    const BROKEN_WGSL: &str = "@vertex fn vs_main( -> @builtin(position) vec4<f32> {";

    // ── compile ───────────────────────────────────────────────────────────

    #[test]
    fn basic_color_program_is_complete() {
        let program = ShaderProgram::basic_color().unwrap();
        assert!(program.shader(ShaderStage::Vertex).is_some());
        assert!(program.shader(ShaderStage::Pixel).is_some());

        let layout = program.input_layout().unwrap();
        assert_eq!(layout.len(), 2);
        assert_eq!(layout[0].offset, 0);
        assert_eq!(layout[0].format, wgpu::VertexFormat::Float32x3);
        assert_eq!(layout[1].offset, 12);
        assert_eq!(layout[1].format, wgpu::VertexFormat::Float32x4);
    }

    #[test]
    fn basic_textured_program_reads_uvs() {
        let program = ShaderProgram::basic_textured().unwrap();
        let layout = program.input_layout().unwrap();
        assert_eq!(layout[2].offset, Vertex::TEX_COORD_OFFSET);
    }

    #[test]
    fn syntax_error_surfaces_diagnostic() {
        let err = Shader::compile(BROKEN_WGSL, "vs_main", ShaderStage::Vertex).unwrap_err();
        let GraphicsError::ShaderCompile { diagnostic, .. } = err else {
            panic!("expected compile error, got {err:?}");
        };
        assert!(!diagnostic.is_empty());
    }

    #[test]
    fn validation_error_surfaces_diagnostic() {
        let src = "@fragment fn fs_main() -> @location(0) vec4<f32> { return 1.0; }";
        let err = Shader::compile(src, "fs_main", ShaderStage::Pixel).unwrap_err();
        assert!(matches!(err, GraphicsError::ShaderCompile { .. }));
    }

    #[test]
    fn missing_entry_point_reported() {
        let err = Shader::compile(BASIC_COLOR_WGSL, "main", ShaderStage::Vertex).unwrap_err();
        assert!(matches!(
            err,
            GraphicsError::MissingEntryPoint { stage: ShaderStage::Vertex, .. }
        ));
    }

    #[test]
    fn entry_point_must_match_stage() {
        let err = Shader::compile(BASIC_COLOR_WGSL, "fs_main", ShaderStage::Vertex).unwrap_err();
        assert!(matches!(err, GraphicsError::MissingEntryPoint { .. }));
    }

    #[test]
    fn legacy_stages_are_unsupported() {
        for stage in [ShaderStage::Geometry, ShaderStage::Hull, ShaderStage::Domain] {
            let err = Shader::compile(BASIC_COLOR_WGSL, "vs_main", stage).unwrap_err();
            assert!(matches!(err, GraphicsError::UnsupportedStage(s) if s == stage));
        }
    }

    #[test]
    fn compute_stage_compiles() {
        let src = "@compute @workgroup_size(1) fn cs_main() {}";
        let shader = Shader::compile(src, "cs_main", ShaderStage::Compute).unwrap();
        assert_eq!(shader.stage(), ShaderStage::Compute);
        assert_eq!(shader.entry_point(), "cs_main");
    }

    // ── files ─────────────────────────────────────────────────────────────

    #[test]
    fn load_from_file_compiles_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(BASIC_COLOR_WGSL.as_bytes()).unwrap();

        let shader = Shader::load_from_file(file.path(), "fs_main", ShaderStage::Pixel).unwrap();
        assert_eq!(shader.stage(), ShaderStage::Pixel);
        assert_eq!(shader.source(), BASIC_COLOR_WGSL);
    }

    #[test]
    fn load_from_missing_file_is_io_error() {
        let err = Shader::load_from_file("does/not/exist.wgsl", "vs_main", ShaderStage::Vertex)
            .unwrap_err();
        assert!(matches!(err, GraphicsError::ShaderIo { .. }));
    }

    // ── program ───────────────────────────────────────────────────────────

    #[test]
    fn input_layout_requires_vertex_shader() {
        let mut program = ShaderProgram::new("pixel only");
        program.add_shader(Shader::compile(BASIC_COLOR_WGSL, "fs_main", ShaderStage::Pixel).unwrap());
        let err = program
            .create_input_layout(&wgpu::vertex_attr_array![0 => Float32x3])
            .unwrap_err();
        assert!(matches!(err, GraphicsError::MissingVertexShader));
        assert!(program.input_layout().is_none());
    }

    #[test]
    fn input_layout_rejects_attribute_past_stride() {
        let mut program = ShaderProgram::basic_color().unwrap();
        let err = program
            .create_input_layout(&[wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x4,
                offset: 40,
                shader_location: 0,
            }])
            .unwrap_err();
        assert!(matches!(err, GraphicsError::InvalidArgument(_)));
    }

    #[test]
    fn input_layout_rejects_duplicate_locations() {
        let mut program = ShaderProgram::basic_color().unwrap();
        let err = program
            .create_input_layout(&[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x4,
                    offset: 12,
                    shader_location: 0,
                },
            ])
            .unwrap_err();
        assert!(matches!(err, GraphicsError::InvalidArgument(_)));
    }

    #[test]
    fn vertex_inputs_come_from_entry_point() {
        let vs = Shader::compile(BASIC_TEXTURED_WGSL, "vs_main", ShaderStage::Vertex).unwrap();
        let locations: Vec<u32> = vs.inputs().iter().map(|i| i.location).collect();
        assert_eq!(locations, [0, 1, 2]);
        assert!(vs.inputs().iter().all(|i| i.kind == naga::ScalarKind::Float));

        let fs = Shader::compile(BASIC_TEXTURED_WGSL, "fs_main", ShaderStage::Pixel).unwrap();
        assert!(fs.inputs().is_empty());
    }

    #[test]
    fn input_layout_rejects_missing_shader_locations() {
        let mut program = ShaderProgram::basic_textured().unwrap();
        let err = program
            .create_input_layout(&wgpu::vertex_attr_array![0 => Float32x3])
            .unwrap_err();
        assert!(matches!(err, GraphicsError::InvalidArgument(_)));
        assert_eq!(program.input_layout().unwrap().len(), 3);
    }

    #[test]
    fn input_layout_rejects_integer_attribute_for_float_input() {
        let mut program = ShaderProgram::basic_color().unwrap();
        let err = program
            .create_input_layout(&[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Uint32x3,
                    offset: 0,
                    shader_location: 0,
                },
                Vertex::POSITION_COLOR_ATTRIBUTES[1],
            ])
            .unwrap_err();
        assert!(matches!(err, GraphicsError::InvalidArgument(_)));
    }

    #[test]
    fn input_layout_allows_unused_extra_attributes() {
        let mut program = ShaderProgram::basic_color().unwrap();
        program
            .create_input_layout(&Vertex::TEXTURED_ATTRIBUTES)
            .unwrap();
        assert_eq!(program.input_layout().unwrap().len(), 3);
    }

    #[test]
    fn add_shader_replaces_same_stage() {
        let mut program = ShaderProgram::basic_color().unwrap();
        let replacement =
            Shader::compile(BASIC_TEXTURED_WGSL, "vs_main", ShaderStage::Vertex).unwrap();
        program.add_shader(replacement);
        assert_eq!(program.shaders().len(), 2);
        assert_eq!(
            program.shader(ShaderStage::Vertex).unwrap().source(),
            BASIC_TEXTURED_WGSL
        );
    }

    #[test]
    fn bind_and_unbind_go_through_context() {
        let program = Arc::new(ShaderProgram::basic_color().unwrap());
        let mut ctx = RecordingContext::default();
        program.bind(&mut ctx);
        program.unbind(&mut ctx);
        assert_eq!(
            ctx.calls,
            vec![
                Call::BindProgram("basic color".to_string()),
                Call::UnbindProgram
            ]
        );
    }
}
