//! Camera system for view-projection matrix management.
//!
//! Both projection modes share one [`Camera`] type. The orthographic mode
//! carries a zoom factor that shrinks the frustum, the perspective mode
//! zooms by moving the eye (see [`Camera::dolly`]).
//!
//! ```ignore
//! use teaplot_render::Camera;
//! use glam::Vec3;
//!
//! let mut flat = Camera::orthographic(1280.0, 800.0, 0.001, 10000.0);
//! flat.look_at(Vec3::new(0.0, 0.0, 500.0), Vec3::ZERO, Vec3::Y);
//! flat.set_zoom(0.8);
//!
//! let mut deep = Camera::perspective(45.0, 1280.0 / 800.0, 1.0, 10000.0);
//! deep.look_at(Vec3::new(0.0, 0.0, 1750.0), Vec3::ZERO, Vec3::Y);
//! let view_projection = deep.view_projection_matrix();
//! ```

use glam::{Mat4, Quat, Vec3};

/// Projection mode for a camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionMode {
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
    Perspective {
        fov_y_radians: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    },
}

/// Lowest pitch cosine an orbit may reach, keeps the eye off the up axis.
const MAX_ORBIT_DOT: f32 = 0.999;

#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    target: Vec3,
    up: Vec3,
    projection: ProjectionMode,
    /// Orthographic frustum divisor. Ignored in perspective mode.
    zoom: f32,
    view_matrix: Mat4,
    projection_matrix: Mat4,
    view_projection_matrix: Mat4,
    /// Set when position, target, up, projection or zoom change.
    dirty: bool,
}

impl Camera {
    /// Create an orthographic camera centred on the origin.
    pub fn orthographic(width: f32, height: f32, near: f32, far: f32) -> Self {
        Self::with_projection(
            ProjectionMode::Orthographic {
                left: -width / 2.0,
                right: width / 2.0,
                bottom: -height / 2.0,
                top: height / 2.0,
                near,
                far,
            },
            Vec3::new(0.0, 0.0, 1.0),
        )
    }

    /// Create a perspective camera.
    ///
    /// # Arguments
    ///
    /// * `fov_y_degrees` - Vertical field of view in degrees
    /// * `aspect_ratio` - Aspect ratio (width / height)
    pub fn perspective(fov_y_degrees: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        Self::with_projection(
            ProjectionMode::Perspective {
                fov_y_radians: fov_y_degrees.to_radians(),
                aspect_ratio,
                near,
                far,
            },
            Vec3::new(0.0, 0.0, 10.0),
        )
    }

    fn with_projection(projection: ProjectionMode, position: Vec3) -> Self {
        let mut camera = Self {
            position,
            target: Vec3::ZERO,
            up: Vec3::Y,
            projection,
            zoom: 1.0,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            view_projection_matrix: Mat4::IDENTITY,
            dirty: true,
        };
        camera.update_matrices();
        camera
    }

    pub fn look_at(&mut self, eye: Vec3, target: Vec3, up: Vec3) {
        self.position = eye;
        self.target = target;
        self.up = up;
        self.dirty = true;
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.dirty = true;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
        self.dirty = true;
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn is_orthographic(&self) -> bool {
        matches!(self.projection, ProjectionMode::Orthographic { .. })
    }

    /// Normalized vector from position to target.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Z)
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize_or(Vec3::X)
    }

    /// Up vector orthogonal to [`forward`](Self::forward).
    pub fn true_up(&self) -> Vec3 {
        self.right().cross(self.forward())
    }

    pub fn set_projection(&mut self, projection: ProjectionMode) {
        self.projection = projection;
        self.dirty = true;
    }

    pub fn projection(&self) -> ProjectionMode {
        self.projection
    }

    /// Update the aspect ratio (only affects perspective cameras).
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        if let ProjectionMode::Perspective {
            fov_y_radians,
            near,
            far,
            ..
        } = self.projection
        {
            self.projection = ProjectionMode::Perspective {
                fov_y_radians,
                aspect_ratio,
                near,
                far,
            };
            self.dirty = true;
        }
    }

    /// Re-centre the orthographic frustum on a new viewport size.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        match self.projection {
            ProjectionMode::Orthographic { near, far, .. } => {
                self.projection = ProjectionMode::Orthographic {
                    left: -width / 2.0,
                    right: width / 2.0,
                    bottom: -height / 2.0,
                    top: height / 2.0,
                    near,
                    far,
                };
                self.dirty = true;
            }
            ProjectionMode::Perspective { .. } => {
                self.set_aspect_ratio(if height > 0.0 { width / height } else { 1.0 });
            }
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Set the orthographic zoom. Values above 1 magnify.
    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom > 0.0 && zoom.is_finite() {
            self.zoom = zoom;
            self.dirty = true;
        }
    }

    /// Scale the eye-to-target distance by `factor`.
    pub fn dolly(&mut self, factor: f32) {
        if factor <= 0.0 || !factor.is_finite() {
            return;
        }
        let offset = self.position - self.target;
        self.position = self.target + offset * factor;
        self.dirty = true;
    }

    /// Translate eye and target together along the view plane.
    pub fn pan(&mut self, right: f32, up: f32) {
        let delta = self.right() * right + self.true_up() * up;
        self.position += delta;
        self.target += delta;
        self.dirty = true;
    }

    /// Rotate the eye around the target by yaw (around `up`) and pitch.
    pub fn orbit(&mut self, yaw: f32, pitch: f32) {
        let offset = self.position - self.target;
        let yawed = Quat::from_axis_angle(self.up, yaw) * offset;

        let axis = yawed.cross(self.up).normalize_or(Vec3::X);
        let pitched = Quat::from_axis_angle(axis, pitch) * yawed;

        let rotated = if pitched.normalize_or_zero().dot(self.up).abs() < MAX_ORBIT_DOT {
            pitched
        } else {
            yawed
        };

        self.position = self.target + rotated;
        self.dirty = true;
    }

    pub fn view_matrix(&mut self) -> Mat4 {
        if self.dirty {
            self.update_matrices();
        }
        self.view_matrix
    }

    pub fn projection_matrix(&mut self) -> Mat4 {
        if self.dirty {
            self.update_matrices();
        }
        self.projection_matrix
    }

    pub fn view_projection_matrix(&mut self) -> Mat4 {
        if self.dirty {
            self.update_matrices();
        }
        self.view_projection_matrix
    }

    fn update_matrices(&mut self) {
        self.view_matrix = Mat4::look_at_rh(self.position, self.target, self.up);

        self.projection_matrix = match self.projection {
            ProjectionMode::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => {
                let cx = (left + right) / 2.0;
                let cy = (top + bottom) / 2.0;
                let hw = (right - left) / (2.0 * self.zoom);
                let hh = (top - bottom) / (2.0 * self.zoom);
                Mat4::orthographic_rh(cx - hw, cx + hw, cy - hh, cy + hh, near, far)
            }
            ProjectionMode::Perspective {
                fov_y_radians,
                aspect_ratio,
                near,
                far,
            } => Mat4::perspective_rh(fov_y_radians, aspect_ratio, near, far),
        };

        self.view_projection_matrix = self.projection_matrix * self.view_matrix;
        self.dirty = false;
    }
}

/// Camera uniform shared by every pipeline at bind group 0.
///
/// ```wgsl
/// struct Camera {
///     view_proj: mat4x4<f32>,
///     right: vec4<f32>,
///     up: vec4<f32>,
///     forward: vec4<f32>,
/// }
/// ```
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    /// Screen-right in world space, used to billboard sprites and lines.
    pub right: [f32; 4],
    pub up: [f32; 4],
    pub forward: [f32; 4],
}

static_assertions::const_assert_eq!(std::mem::size_of::<CameraUniform>() % 16, 0);

impl CameraUniform {
    pub fn from_camera(camera: &mut Camera) -> Self {
        Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            right: camera.right().extend(0.0).to_array(),
            up: camera.true_up().extend(0.0).to_array(),
            forward: camera.forward().extend(0.0).to_array(),
        }
    }
}

/// GPU buffer and bind group for [`CameraUniform`].
pub struct CameraBinding {
    buffer: wgpu::Buffer,
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl CameraBinding {
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Uniform Buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Camera Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            buffer,
            layout,
            bind_group,
        }
    }

    pub fn update(&self, queue: &wgpu::Queue, uniform: &CameraUniform) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(uniform));
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
