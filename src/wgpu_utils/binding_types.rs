// src/wgpu_utils/binding_types.rs
//! Buffer binding types sized from the Rust type they hold

use std::num::NonZeroU64;

/// Uniform binding validated against the size of `T` at pipeline creation
pub fn uniform_sized<T>() -> wgpu::BindingType {
    wgpu::BindingType::Buffer {
        ty: wgpu::BufferBindingType::Uniform,
        has_dynamic_offset: false,
        min_binding_size: NonZeroU64::new(std::mem::size_of::<T>() as u64),
    }
}

/// Storage binding whose elements are `T`; the buffer must hold at least one
pub fn storage_array_sized<T>(read_only: bool) -> wgpu::BindingType {
    wgpu::BindingType::Buffer {
        ty: wgpu::BufferBindingType::Storage { read_only },
        has_dynamic_offset: false,
        min_binding_size: NonZeroU64::new(std::mem::size_of::<T>() as u64),
    }
}
