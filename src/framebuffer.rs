// filepath: src/framebuffer.rs
//! Linux fbdev display surface
//!
//! Opens the framebuffer node, reads its fixed and variable screen info and
//! maps the whole buffer shared read/write.

use std::{
    fs::{File, OpenOptions},
    os::fd::AsRawFd,
    path::{Path, PathBuf},
};

use log::info;
use memmap2::{MmapMut, MmapOptions};

use crate::config::StyleConfig;
use crate::error::SurfaceError;
use crate::pixel::PixelFormat;
use crate::surface::{Compositor, RenderFrame, Surface, SurfaceGeometry};

const FBIOGET_VSCREENINFO: u16 = 0x4600;
const FBIOGET_FSCREENINFO: u16 = 0x4602;

#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct FbBitfield {
    pub offset: u32,
    pub length: u32,
    pub msb_right: u32,
}

/// `struct fb_var_screeninfo` from linux/fb.h
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct FbVarScreenInfo {
    pub xres: u32,
    pub yres: u32,
    pub xres_virtual: u32,
    pub yres_virtual: u32,
    pub xoffset: u32,
    pub yoffset: u32,
    pub bits_per_pixel: u32,
    pub grayscale: u32,
    pub red: FbBitfield,
    pub green: FbBitfield,
    pub blue: FbBitfield,
    pub transp: FbBitfield,
    pub nonstd: u32,
    pub activate: u32,
    pub height: u32,
    pub width: u32,
    pub accel_flags: u32,
    pub pixclock: u32,
    pub left_margin: u32,
    pub right_margin: u32,
    pub upper_margin: u32,
    pub lower_margin: u32,
    pub hsync_len: u32,
    pub vsync_len: u32,
    pub sync: u32,
    pub vmode: u32,
    pub rotate: u32,
    pub colorspace: u32,
    pub reserved: [u32; 4],
}

/// `struct fb_fix_screeninfo` from linux/fb.h
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct FbFixScreenInfo {
    pub id: [u8; 16],
    pub smem_start: nix::libc::c_ulong,
    pub smem_len: u32,
    pub type_: u32,
    pub type_aux: u32,
    pub visual: u32,
    pub xpanstep: u16,
    pub ypanstep: u16,
    pub ywrapstep: u16,
    pub line_length: u32,
    pub mmio_start: nix::libc::c_ulong,
    pub mmio_len: u32,
    pub accel: u32,
    pub capabilities: u16,
    pub reserved: [u16; 2],
}

nix::ioctl_read_bad!(read_var_screeninfo, FBIOGET_VSCREENINFO, FbVarScreenInfo);
nix::ioctl_read_bad!(read_fix_screeninfo, FBIOGET_FSCREENINFO, FbFixScreenInfo);

/// Check the reported layout against the mapping before any pixel is touched
pub fn validate_geometry(
    var: &FbVarScreenInfo,
    fix: &FbFixScreenInfo,
) -> Result<SurfaceGeometry, SurfaceError> {
    let format = PixelFormat::from_bits_per_pixel(var.bits_per_pixel).ok_or(
        SurfaceError::UnsupportedFormat {
            bits_per_pixel: var.bits_per_pixel,
        },
    )?;
    if var.xres == 0 || var.yres == 0 {
        return Err(SurfaceError::Geometry {
            reason: format!("empty resolution {}x{}", var.xres, var.yres),
        });
    }
    let stride = fix.line_length as usize;
    let min_stride = var.xres as usize * format.bytes_per_pixel();
    if stride < min_stride {
        return Err(SurfaceError::Geometry {
            reason: format!("line length {stride} shorter than {min_stride} bytes of pixels"),
        });
    }
    let needed = stride * var.yres as usize;
    if needed > fix.smem_len as usize {
        return Err(SurfaceError::Geometry {
            reason: format!("{needed} bytes of rows exceed {} byte buffer", fix.smem_len),
        });
    }
    Ok(SurfaceGeometry {
        width: var.xres,
        height: var.yres,
        stride,
        format,
    })
}

pub struct Framebuffer {
    path: PathBuf,
    file: Option<File>,
    map: Option<MmapMut>,
    geometry: SurfaceGeometry,
    compositor: Compositor,
}

impl Framebuffer {
    pub fn open(path: &Path, style: StyleConfig) -> Result<Self, SurfaceError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| SurfaceError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        let mut var = FbVarScreenInfo::default();
        let mut fix = FbFixScreenInfo::default();
        let fd = file.as_raw_fd();
        // SAFETY: both structs are repr(C) mirrors of the kernel's and outlive the calls.
        let queried = unsafe {
            read_fix_screeninfo(fd, &mut fix).and_then(|_| read_var_screeninfo(fd, &mut var))
        };
        queried.map_err(|source| SurfaceError::Query {
            path: path.to_path_buf(),
            source,
        })?;

        let geometry = validate_geometry(&var, &fix)?;
        let buffer_size = fix.smem_len as usize;

        // SAFETY: the display driver owns the memory; the mapping is only
        // touched from the render thread.
        let map = unsafe { MmapOptions::new().len(buffer_size).map_mut(&file) }.map_err(
            |source| SurfaceError::Map {
                path: path.to_path_buf(),
                source,
            },
        )?;

        info!(
            "Framebuffer mapped: {}x{} bpp={} line_len={} size={}",
            geometry.width, geometry.height, var.bits_per_pixel, geometry.stride, buffer_size
        );
        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
            map: Some(map),
            geometry,
            compositor: Compositor::new(style),
        })
    }
}

impl Surface for Framebuffer {
    fn width(&self) -> u32 {
        self.geometry.width
    }

    fn height(&self) -> u32 {
        self.geometry.height
    }

    fn render_frame(&mut self, frame: &RenderFrame) {
        let Some(map) = self.map.as_mut() else {
            return;
        };
        self.compositor.compose(map, self.geometry, frame);
    }

    fn shutdown(&mut self) {
        // No msync: many fbdev drivers reject it
        drop(self.map.take());
        if self.file.take().is_some() {
            info!("Framebuffer {} released", self.path.display());
        }
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
