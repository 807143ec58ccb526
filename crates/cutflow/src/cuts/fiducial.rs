//! Fiducial volume cuts.
//!
//! The fiducial volume defines the region in depth and radius that is
//! trusted for the exposure, where the background distribution is flat.
//! Several definitions coexist: cylinders on the 2D and 3D position
//! reconstructions, a Z-optimized volume, an inner "egg" volume, a
//! phi-dependent four-leaf-clover volume and a mass-parametrized ellipsoid
//! family used for benchmarking.

use crate::cut::{CompositeCut, Cut, ExpressionCut, FamilyTemplate};
use crate::dataset::{Column, Dataset};
use crate::error::Result;
use crate::expr::{self, Expr};
use crate::external::RadiusCurve;

/// 1 t cylinder on the TPF 2D reconstruction, with the radius derived from
/// the raw x/y positions.
pub fn fiducial_cylinder_1t_tpf() -> Result<ExpressionCut> {
    ExpressionCut::new(
        "FiducialCylinder1TTpf2dFdc",
        4,
        "(-92.9 < z) & (z < -9) & (r < 36.94)",
    )?
    .with_derived("r", "sqrt(x*x + y*y)")
}

/// 1 t cylinder on the NN 3D field-distortion-corrected positions.
pub fn fiducial_cylinder_1t() -> Result<ExpressionCut> {
    ExpressionCut::new(
        "FiducialCylinder1T",
        5,
        "(-92.9 < z_3d_nn) & (z_3d_nn < -9) & (r_3d_nn < 36.94)",
    )
}

/// Larger 1.3 t cylinder for benchmarking and development.
pub fn fiducial_cylinder_1p3t() -> Result<ExpressionCut> {
    ExpressionCut::new(
        "FiducialCylinder1p3T",
        0,
        "(-92.9 < z_3d_nn) & (z_3d_nn < -9) & (r_3d_nn < 41.26)",
    )
}

/// Z-optimized volume: expected rate variation kept within a 10% threshold
/// in each R slice, accounting for all background models.
pub fn fiducial_z_optimized() -> Result<ExpressionCut> {
    ExpressionCut::new(
        "FiducialZOptimized",
        4,
        "(-94 < z_3d_nn) & (z_3d_nn < -8) & (r_3d_nn < 42.8387) & \
         (z_3d_nn < -2.63725 - 0.00946597*r_3d_nn*r_3d_nn) & \
         (z_3d_nn > -158.173 + 0.0456094*r_3d_nn*r_3d_nn)",
    )
}

/// Inner-most clean volume, optimized against the radiogenic neutron
/// position distribution.
pub fn fiducial_inner_egg() -> Result<CompositeCut> {
    CompositeCut::new(
        "FiducialInnerEgg",
        0,
        vec![
            Box::new(ExpressionCut::new(
                "FiducialInnerEggUpper",
                0,
                "(z_3d_nn < -49.43) | \
                 (((z_3d_nn + 49.43)/36.35)**2.43474462 + (r_3d_nn*r_3d_nn/1367)**2.43474462 < 1.0)",
            )?) as Box<dyn Cut>,
            Box::new(ExpressionCut::new(
                "FiducialInnerEggLower",
                0,
                "(z_3d_nn > -55.28) | \
                 ((-(z_3d_nn + 55.28)/26.24)**2.00197758 + (r_3d_nn*r_3d_nn/1365)**2.00197758 < 1.0)",
            )?),
            Box::new(ExpressionCut::new(
                "FiducialInnerEggEdge",
                0,
                "r_3d_nn < 34.5903754",
            )?),
        ],
    )
}

/// AmBe calibration fiducial: same Z range as the 1 t cylinder, a wider
/// radius, plus a maximum distance to the neutron source position to cut
/// away background ER.
pub fn ambe_fiducial() -> Result<ExpressionCut> {
    // I-Belt 1 source position (x, y, z) in cm.
    ExpressionCut::new(
        "AmBeFiducial",
        2,
        "(distance_to_source < 103.5) & (-92.9 < z) & (z < -9) & (r < 42.00)",
    )?
    .with_derived(
        "distance_to_source",
        "sqrt((97 - x)**2 + (43.5 - y)**2 + (-50 - z)**2)",
    )?
    .with_derived("r", "sqrt(x*x + y*y)")
}

/// Mass (kg) and ellipsoid parameters (z0, vz, p, vr2) for the optimized
/// ellipsoid volumes, one row per target mass.
pub const FV_CONFIGS: &[(u32, [f64; 4])] = &[
    (1000, [-57.58, 31.25, 4.20, 1932.53]),
    (1025, [-57.29, 31.65, 3.71, 1987.85]),
    (1050, [-62.25, 33.89, 3.08, 1969.68]),
    (1075, [-59.73, 35.58, 2.97, 1938.27]),
    (1100, [-58.36, 36.97, 2.67, 1951.06]),
    (1125, [-58.57, 37.36, 2.78, 1953.64]),
    (1150, [-58.71, 37.37, 3.25, 1934.94]),
    (1175, [-57.35, 38.17, 3.14, 1944.21]),
    (1200, [-56.44, 39.23, 2.88, 1961.09]),
    (1225, [-55.81, 40.30, 2.80, 1969.58]),
    (1250, [-55.44, 40.70, 3.21, 1936.89]),
    (1275, [-54.62, 41.19, 3.29, 1937.40]),
    (1300, [-54.04, 42.08, 2.56, 2041.03]),
    (1325, [-53.31, 42.52, 2.85, 2005.24]),
    (1350, [-51.63, 43.64, 3.15, 1949.59]),
    (1375, [-51.85, 44.07, 2.87, 2003.40]),
    (1400, [-52.22, 43.88, 3.88, 1949.48]),
    (1425, [-50.87, 45.22, 2.75, 2046.11]),
    (1450, [-51.66, 43.60, 3.58, 2053.80]),
    (1475, [-51.99, 43.92, 3.88, 2044.43]),
    (1500, [-52.50, 43.69, 4.31, 2059.53]),
    (1525, [-51.51, 44.67, 3.68, 2093.78]),
    (1550, [-51.13, 45.04, 3.98, 2088.21]),
    (1575, [-49.44, 46.67, 3.43, 2091.66]),
    (1600, [-50.15, 45.95, 3.77, 2126.11]),
    (1625, [-50.06, 45.99, 4.32, 2119.37]),
    (1650, [-50.16, 45.95, 4.67, 2137.15]),
    (1675, [-49.10, 47.05, 4.53, 2128.00]),
    (1700, [-49.54, 46.51, 6.10, 2129.72]),
];

/// The ellipsoid template shared by every mass point.
pub fn fiducial_ellipsoid_template() -> Result<FamilyTemplate> {
    FamilyTemplate::new(
        "FiducialEllipsoid",
        1,
        "((((z_3d_nn - @z0)**2)**0.5 / @vz)**@p + (r_3d_nn**2 / @vr2)**@p) < 1",
        &["z0", "vz", "p", "vr2"],
    )?
    .with_derived("r_3d_nn", "sqrt(x_3d_nn**2 + y_3d_nn**2)")
}

/// One ellipsoid fiducial cut per [`FV_CONFIGS`] mass point, e.g.
/// `FiducialEllipsoid1250`.
pub fn fiducial_ellipsoid_family() -> Result<Vec<ExpressionCut>> {
    let template = fiducial_ellipsoid_template()?;
    let entries: Vec<(String, Vec<f64>)> = FV_CONFIGS
        .iter()
        .map(|(mass, params)| (mass.to_string(), params.to_vec()))
        .collect();
    template.build_family(&entries)
}

// Four-leaf-clover volume: two depth planes plus a curved surface that
// stays a fixed distance from the measured TPC walls.
const CLOVER_RADIUS_SCALING: f64 = 41.0;
const CLOVER_RADIUS_OFFSET: f64 = 1.0;
const CLOVER_DEPTH_UPPER: f64 = -9.0;
const CLOVER_DEPTH_LOWER: f64 = -96.9 + 4.0;

/// Fiducial volume with a phi-dependent maximum radius taken from a
/// measured wall-position reference curve.
pub struct FourLeafCloverFiducial {
    curve: RadiusCurve,
    predicate: Expr,
}

impl FourLeafCloverFiducial {
    pub fn new(curve: RadiusCurve) -> Result<Self> {
        Ok(Self {
            curve,
            predicate: expr::parse_predicate("(-92.9 < z) & (z < -9) & (r_phi < r_max)")?,
        })
    }

    /// Depth-dependent radius: increases the top radius by the offset and
    /// decreases the bottom one, keeping a straight line in R2-Z space so
    /// the volume stays the same.
    fn coffee_radius(z: f64, radius: f64, offset: f64, height: f64, z_center: f64) -> f64 {
        let upper = (radius + offset).powi(2);
        let lower = (radius - offset).powi(2);
        (((upper - lower) / height) * (z - z_center + height / 2.0) + lower).sqrt()
    }
}

impl Cut for FourLeafCloverFiducial {
    fn tag(&self) -> &str {
        "FiducialFourLeafClover1250kg"
    }

    fn version(&self) -> u32 {
        1
    }

    fn pre(&self, dataset: &mut Dataset) -> Result<()> {
        let x = dataset.numeric("x")?;
        let y = dataset.numeric("y")?;
        let z = dataset.numeric("z")?;

        let height = CLOVER_DEPTH_UPPER - CLOVER_DEPTH_LOWER;
        let z_center = CLOVER_DEPTH_UPPER - height / 2.0;
        let scale = CLOVER_RADIUS_SCALING / self.curve.average_radius();

        let mut r_phi = Vec::with_capacity(x.len());
        let mut r_max = Vec::with_capacity(x.len());
        for ((&xi, &yi), &zi) in x.iter().zip(&y).zip(&z) {
            let rho = xi.hypot(yi);
            let phi = yi.atan2(xi);
            let wall = self.curve.radius_at(phi);
            r_phi.push(rho);
            r_max.push(
                scale
                    * Self::coffee_radius(zi, wall, CLOVER_RADIUS_OFFSET, height, z_center),
            );
        }
        dataset.insert("r_phi", Column::Float(r_phi))?;
        dataset.insert("r_max", Column::Float(r_max))
    }

    fn test(&self, dataset: &mut Dataset) -> Result<()> {
        let verdicts =
            expr::evaluate_predicate(&self.predicate, dataset, &Default::default())?;
        dataset.insert(self.tag().to_string(), Column::Bool(verdicts))
    }

    fn post(&self, dataset: &mut Dataset) -> Result<()> {
        dataset.remove("r_phi");
        dataset.remove("r_max");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> Dataset {
        let mut ds = Dataset::with_rows(x.len());
        ds.insert("x", Column::Float(x)).unwrap();
        ds.insert("y", Column::Float(y)).unwrap();
        ds.insert("z", Column::Float(z)).unwrap();
        ds
    }

    #[test]
    fn cylinder_bounds_depth_and_radius() {
        let mut ds = positions(
            vec![10.0, 10.0, 40.0],
            vec![0.0, 0.0, 0.0],
            vec![-50.0, -5.0, -50.0],
        );
        let cut = fiducial_cylinder_1t_tpf().unwrap();
        cut.evaluate(&mut ds).unwrap();
        assert_eq!(
            ds.boolean("FiducialCylinder1TTpf2dFdc").unwrap(),
            &[true, false, false]
        );
        assert!(!ds.has_column("r"));
    }

    #[test]
    fn ellipsoid_family_covers_every_mass_point() {
        let family = fiducial_ellipsoid_family().unwrap();
        assert_eq!(family.len(), FV_CONFIGS.len());
        assert_eq!(family[0].tag(), "FiducialEllipsoid1000");
        assert_eq!(family.last().unwrap().tag(), "FiducialEllipsoid1700");
    }

    #[test]
    fn ellipsoid_accepts_center_rejects_wall() {
        let family = fiducial_ellipsoid_family().unwrap();
        let cut = &family[10]; // 1250 kg
        let mut ds = Dataset::with_rows(2);
        ds.insert("x_3d_nn", Column::Float(vec![0.0, 47.0])).unwrap();
        ds.insert("y_3d_nn", Column::Float(vec![0.0, 0.0])).unwrap();
        ds.insert("z_3d_nn", Column::Float(vec![-55.44, -5.0]))
            .unwrap();
        cut.evaluate(&mut ds).unwrap();
        assert_eq!(
            ds.boolean("FiducialEllipsoid1250").unwrap(),
            &[true, false]
        );
    }

    #[test]
    fn clover_uses_curve_and_cleans_up() {
        // Circular wall at 45 cm; the scaled max radius stays near 41 cm.
        let n = 360;
        let phi: Vec<f64> = (0..n)
            .map(|i| -std::f64::consts::PI + i as f64 * 2.0 * std::f64::consts::PI / n as f64)
            .collect();
        let radius = vec![45.0; n];
        let curve = RadiusCurve::from_points(phi, radius).unwrap();

        let mut ds = positions(
            vec![10.0, 44.0, 10.0],
            vec![0.0, 0.0, 0.0],
            vec![-50.0, -50.0, -5.0],
        );
        let cut = FourLeafCloverFiducial::new(curve).unwrap();
        cut.evaluate(&mut ds).unwrap();
        assert_eq!(
            ds.boolean("FiducialFourLeafClover1250kg").unwrap(),
            &[true, false, false]
        );
        assert!(!ds.has_column("r_phi") && !ds.has_column("r_max"));
    }

    #[test]
    fn inner_egg_is_a_three_cut_composite() {
        let composite = fiducial_inner_egg().unwrap();
        assert_eq!(
            composite.child_tags(),
            vec![
                "FiducialInnerEggUpper",
                "FiducialInnerEggLower",
                "FiducialInnerEggEdge"
            ]
        );
    }
}
