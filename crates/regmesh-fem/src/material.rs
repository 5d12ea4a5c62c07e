//! Material properties.

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

/// Arena index of a material; equal to its global number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialId(pub usize);

impl MaterialId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Isotropic linear elastic material.
///
/// Defaults: E = 100, A = 1, I = 1, nu = 0.2, thickness 1, density-heat product 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialLinearElasticity {
    pub global_number: usize,
    /// Young's modulus E.
    pub youngs_modulus: f64,
    /// Cross-sectional area A.
    pub cross_sectional_area: f64,
    /// Moment of inertia I.
    pub moment_of_inertia: f64,
    /// Poisson's ratio nu.
    pub poisson_ratio: f64,
    /// Plate thickness h.
    pub thickness: f64,
    /// Density times specific heat.
    pub density_heat_product: f64,
}

impl Default for MaterialLinearElasticity {
    fn default() -> Self {
        Self {
            global_number: 0,
            youngs_modulus: 100.0,
            cross_sectional_area: 1.0,
            moment_of_inertia: 1.0,
            poisson_ratio: 0.2,
            thickness: 1.0,
            density_heat_product: 1.0,
        }
    }
}

impl MaterialLinearElasticity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_youngs_modulus(mut self, youngs_modulus: f64) -> Self {
        self.youngs_modulus = youngs_modulus;
        self
    }

    pub fn with_cross_sectional_area(mut self, area: f64) -> Self {
        self.cross_sectional_area = area;
        self
    }

    pub fn with_moment_of_inertia(mut self, moment_of_inertia: f64) -> Self {
        self.moment_of_inertia = moment_of_inertia;
        self
    }

    pub fn with_poisson_ratio(mut self, poisson_ratio: f64) -> Self {
        self.poisson_ratio = poisson_ratio;
        self
    }

    pub fn with_thickness(mut self, thickness: f64) -> Self {
        self.thickness = thickness;
        self
    }

    /// Plane-stress constitutive matrix relating `[exx, eyy, gxy]` to `[sxx, syy, sxy]`.
    pub fn plane_stress_matrix(&self) -> Matrix3<f64> {
        let nu = self.poisson_ratio;
        let scale = self.youngs_modulus / (1.0 - nu * nu);
        Matrix3::new(
            scale,
            scale * nu,
            0.0,
            scale * nu,
            scale,
            0.0,
            0.0,
            0.0,
            scale * (1.0 - nu) / 2.0,
        )
    }
}

/// Materials a mesh can reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Material {
    LinearElasticity(MaterialLinearElasticity),
}

impl Material {
    pub fn global_number(&self) -> usize {
        match self {
            Material::LinearElasticity(m) => m.global_number,
        }
    }

    pub fn set_global_number(&mut self, global_number: usize) {
        match self {
            Material::LinearElasticity(m) => m.global_number = global_number,
        }
    }

    pub fn as_linear_elasticity(&self) -> Option<&MaterialLinearElasticity> {
        match self {
            Material::LinearElasticity(m) => Some(m),
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Material::LinearElasticity(MaterialLinearElasticity::default())
    }
}

impl From<MaterialLinearElasticity> for Material {
    fn from(material: MaterialLinearElasticity) -> Self {
        Material::LinearElasticity(material)
    }
}
