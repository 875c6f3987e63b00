//! Lambert Conformal Conic projection onto the forecast service's grid.

use std::f64::consts::{FRAC_PI_4, PI};

use crate::model::{GeoCoordinate, GridCell};

/// Cartographic parameters of a Lambert Conformal Conic grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambertConformalGrid {
    /// Earth radius in kilometres.
    pub earth_radius_km: f64,
    /// Distance between neighbouring cells in kilometres.
    pub grid_spacing_km: f64,
    pub standard_parallel_1: f64,
    pub standard_parallel_2: f64,
    pub origin_longitude: f64,
    pub origin_latitude: f64,
    /// Grid indices of the origin point.
    pub origin_x: f64,
    pub origin_y: f64,
}

/// The 5 km grid used by the KMA short-term forecast services.
pub const KMA: LambertConformalGrid = LambertConformalGrid {
    earth_radius_km: 6371.00877,
    grid_spacing_km: 5.0,
    standard_parallel_1: 30.0,
    standard_parallel_2: 60.0,
    origin_longitude: 126.0,
    origin_latitude: 38.0,
    origin_x: 43.0,
    origin_y: 136.0,
};

impl LambertConformalGrid {
    /// Projects a coordinate onto the grid.
    ///
    /// Total over finite input. Points outside the national domain still
    /// produce indices; see [`GridCell::is_within_kma_domain`].
    pub fn project(&self, coord: GeoCoordinate) -> GridCell {
        let re = self.earth_radius_km / self.grid_spacing_km;
        let slat1 = self.standard_parallel_1.to_radians();
        let slat2 = self.standard_parallel_2.to_radians();
        let olon = self.origin_longitude.to_radians();
        let olat = self.origin_latitude.to_radians();

        let half_tan = |lat: f64| (FRAC_PI_4 + lat * 0.5).tan();

        let sn = (slat1.cos() / slat2.cos()).ln() / (half_tan(slat2) / half_tan(slat1)).ln();
        let sf = half_tan(slat1).powf(sn) * slat1.cos() / sn;
        let ro = re * sf / half_tan(olat).powf(sn);

        let ra = re * sf / half_tan(coord.latitude.to_radians()).powf(sn);
        let theta = sn * normalize_angle(coord.longitude.to_radians() - olon);

        GridCell {
            nx: round_half_up(ra * theta.sin() + self.origin_x),
            ny: round_half_up(ro - ra * theta.cos() + self.origin_y),
        }
    }
}

/// Projects onto the KMA grid.
pub fn project(coord: GeoCoordinate) -> GridCell {
    KMA.project(coord)
}

fn normalize_angle(theta: f64) -> f64 {
    if theta > PI {
        theta - 2.0 * PI
    } else if theta < -PI {
        theta + 2.0 * PI
    } else {
        theta
    }
}

fn round_half_up(v: f64) -> i32 {
    (v + 0.5).floor() as i32
}
