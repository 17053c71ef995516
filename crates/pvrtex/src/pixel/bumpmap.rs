use color::Rgba8;
use std::f32::consts::PI;

/// Encodes a surface normal (`r/g/b` channels carry `nx/ny/nz`, each mapped
/// from `-1.0..=1.0` onto `0..=255`) into the spherical `(S, R)` bumpmap
/// representation: `S` is the inclination from the +Z pole, `R` is the
/// azimuth around it.
#[must_use]
pub fn encode_bumpmap(normal: Rgba8) -> u16 {
    let (nx, ny, nz) = to_unit_normal(normal);

    let inclination = nz.clamp(-1.0, 1.0).acos();
    let azimuth = if nx == 0.0 && ny == 0.0 { 0.0 } else { ny.atan2(nx) };
    let azimuth = if azimuth < 0.0 { azimuth + 2.0 * PI } else { azimuth };

    let s = color::clamp255((1.0 - inclination / (PI / 2.0)) * 255.0);
    let r = color::clamp255(azimuth / (2.0 * PI) * 255.0);

    (u16::from(s) << 8) | u16::from(r)
}

#[must_use]
pub fn decode_bumpmap(bits: u16) -> Rgba8 {
    let s = (bits >> 8) as u8;
    let r = bits as u8;

    let inclination = (1.0 - f32::from(s) / 255.0) * (PI / 2.0);
    let azimuth = f32::from(r) / 255.0 * 2.0 * PI;

    let nz = inclination.cos();
    let sin_incl = inclination.sin();
    let nx = sin_incl * azimuth.cos();
    let ny = sin_incl * azimuth.sin();

    from_unit_normal(nx, ny, nz)
}

fn to_unit_normal(c: Rgba8) -> (f32, f32, f32) {
    let to_signed = |v: u8| f32::from(v) / 255.0 * 2.0 - 1.0;
    (to_signed(c.r), to_signed(c.g), to_signed(c.b))
}

fn from_unit_normal(nx: f32, ny: f32, nz: f32) -> Rgba8 {
    let to_byte = |v: f32| color::clamp255((v.clamp(-1.0, 1.0) + 1.0) / 2.0 * 255.0);
    Rgba8::new(to_byte(nx), to_byte(ny), to_byte(nz), 255)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn north_pole_has_zero_inclination() {
        let normal = from_unit_normal(0.0, 0.0, 1.0);
        let bits = encode_bumpmap(normal);
        let s = (bits >> 8) as u8;
        assert_eq!(s, 255);
    }

    #[test]
    fn round_trips_within_tolerance() {
        let normal = from_unit_normal(0.3, 0.4, 0.866);
        let decoded = decode_bumpmap(encode_bumpmap(normal));
        let (nx0, ny0, nz0) = to_unit_normal(normal);
        let (nx1, ny1, nz1) = to_unit_normal(decoded);
        assert!((nx0 - nx1).abs() < 0.05);
        assert!((ny0 - ny1).abs() < 0.05);
        assert!((nz0 - nz1).abs() < 0.05);
    }
}
