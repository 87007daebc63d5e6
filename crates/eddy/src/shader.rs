//! Kernel source resolution.
//!
//! Each solver stage is backed by a WGSL kernel. Sources are resolved from a
//! shader directory at startup so kernels can be edited without rebuilding;
//! when a file is absent or unreadable the embedded copy shipped with the
//! binary is used instead, and the run continues in that degraded mode.

use std::collections::HashMap;
use std::path::Path;

use crate::gpu::pipelines::StageKind;

const EMBEDDED: [(StageKind, &str); 5] = [
    (
        StageKind::Diffusion,
        include_str!("gpu/shaders/jacobi_diffusion.wgsl"),
    ),
    (
        StageKind::Pressure,
        include_str!("gpu/shaders/jacobi_pressure.wgsl"),
    ),
    (
        StageKind::DivergenceRemoval,
        include_str!("gpu/shaders/remove_divergence.wgsl"),
    ),
    (StageKind::Advection, include_str!("gpu/shaders/advect.wgsl")),
    (StageKind::Swap, include_str!("gpu/shaders/swap_state.wgsl")),
];

/// Maps each stage to the WGSL source its pipeline is built from.
pub struct KernelCatalog {
    sources: HashMap<&'static str, String>,
}

impl KernelCatalog {
    /// Catalog holding only the embedded kernel sources.
    pub fn builtin() -> Self {
        let sources = EMBEDDED
            .iter()
            .map(|&(kind, source)| (kind.kernel_file(), source.to_owned()))
            .collect();
        Self { sources }
    }

    /// Resolves kernels from `dir`, falling back per stage to the embedded
    /// copy when the file cannot be read.
    pub fn load(dir: &Path) -> Self {
        let mut catalog = Self::builtin();

        for kind in StageKind::ALL {
            let path = dir.join(kind.kernel_file());
            if !path.is_file() {
                log::debug!(
                    "kernel {} not found on disk, using embedded copy",
                    path.display()
                );
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(source) => {
                    log::info!("loaded kernel {}", path.display());
                    catalog.sources.insert(kind.kernel_file(), source);
                }
                Err(error) => {
                    log::error!(
                        "failed to read kernel {}: {error}; using embedded copy",
                        path.display()
                    );
                }
            }
        }

        catalog
    }

    pub fn source(&self, kind: StageKind) -> Option<&str> {
        self.sources.get(kind.kernel_file()).map(String::as_str)
    }

    /// Replaces a stage's kernel source.
    pub fn set(&mut self, kind: StageKind, source: String) {
        self.sources.insert(kind.kernel_file(), source);
    }

    /// Drops a stage's kernel source entirely, leaving its pipeline unbuilt.
    pub fn remove(&mut self, kind: StageKind) {
        self.sources.remove(kind.kernel_file());
    }
}
