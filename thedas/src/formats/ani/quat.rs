//! Packed quaternion decompression
//!
//! ANI keyframes store unit rotation quaternions in one of three bit-packed
//! layouts (32, 48 and 64 bits). Each stores three components plus a 2-bit
//! order code; the fourth component is reconstructed as
//! `sqrt(max(0, 1 - q1^2 - q2^2 - q3^2))` and scattered into the output
//! slot selected by the order code, so numerically impossible inputs clamp
//! to zero instead of producing NaN.

use std::f32::consts::SQRT_2;

/// Decompress a packed quaternion into (x, y, z, w).
///
/// `quality` selects the layout: 2 = 32-bit (all in `quat32`), 3 = 48-bit
/// (15 significant bits in each of `quat32`/`quat64`/`quat48`), 4 = 64-bit
/// (21+21+20 bits split across `quat32` and `quat64`). Any other quality
/// yields the identity quaternion.
///
/// For the 64-bit layout the caller passes the file's *second* word as
/// `quat32` and the *first* as `quat64`: the field conventionally labeled
/// for the low half holds the high bits in shipped files. Preserved as-is;
/// do not "fix" without a counter-example file.
pub fn decompress_quat(quat32: u32, quat64: u32, quat48: u16, quality: u32) -> [f32; 4] {
    let (q1, q2, q3, order) = match quality {
        2 => {
            let raw1 = ((quat32 >> 22) & 0x3FF) as i32;
            let raw2 = ((quat32 >> 12) & 0x3FF) as i32;
            let raw3 = ((quat32 >> 2) & 0x3FF) as i32;
            (
                (raw1 - 512) as f32 / (SQRT_2 * 511.0),
                (raw2 - 512) as f32 / (SQRT_2 * 511.0),
                (raw3 - 512) as f32 / (SQRT_2 * 511.0),
                quat32 & 0x3,
            )
        }
        4 => {
            let raw1 = ((quat32 >> 11) & 0x1FFFFF) as i32;
            let raw2 = (((quat32 & 0x7FF) << 10) | ((quat64 >> 22) & 0x3FF)) as i32;
            let raw3 = ((quat64 >> 2) & 0xFFFFF) as i32;
            (
                (raw1 - 1048576) as f32 / (SQRT_2 * 1048575.0),
                (raw2 - 1048576) as f32 / (SQRT_2 * 1048575.0),
                (raw3 - 524288) as f32 / (SQRT_2 * 524287.0),
                quat64 & 0x3,
            )
        }
        3 => {
            let raw1 = ((quat32 >> 1) & 0x7FFF) as i32;
            let raw2 = ((quat64 >> 1) & 0x7FFF) as i32;
            let raw3 = ((u32::from(quat48) >> 1) & 0x7FFF) as i32;
            (
                (raw1 - 16384) as f32 / (SQRT_2 * 16383.0),
                (raw2 - 16384) as f32 / (SQRT_2 * 16383.0),
                (raw3 - 16384) as f32 / (SQRT_2 * 16383.0),
                ((quat32 & 1) << 1) | (quat64 & 1),
            )
        }
        _ => return [0.0, 0.0, 0.0, 1.0],
    };

    let sq = 1.0 - q1 * q1 - q2 * q2 - q3 * q3;
    let q0 = if sq > 0.0 { sq.sqrt() } else { 0.0 };

    match order {
        0 => [q0, q1, q2, q3],
        1 => [q1, q0, q2, q3],
        2 => [q1, q2, q0, q3],
        _ => [q1, q2, q3, q0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(q: [f32; 4]) -> f32 {
        (q[0] * q[0] + q[1] * q[1] + q[2] * q[2] + q[3] * q[3]).sqrt()
    }

    /// 32-bit packing of three components with an order code.
    fn pack32(c1: u32, c2: u32, c3: u32, order: u32) -> u32 {
        (c1 << 22) | (c2 << 12) | (c3 << 2) | order
    }

    #[test]
    fn identity_at_all_orders_is_unit() {
        // Components at the midpoint encode zero; q0 reconstructs to 1
        for order in 0..4 {
            let q = decompress_quat(pack32(512, 512, 512, order), 0, 0, 2);
            assert!((norm(q) - 1.0).abs() < 1.0e-4, "order {order}: {q:?}");
        }
    }

    #[test]
    fn order_code_selects_reconstructed_slot() {
        let q = decompress_quat(pack32(512, 512, 512, 0), 0, 0, 2);
        assert!((q[0] - 1.0).abs() < 1.0e-4);
        let q = decompress_quat(pack32(512, 512, 512, 3), 0, 0, 2);
        assert!((q[3] - 1.0).abs() < 1.0e-4);
    }

    #[test]
    fn quat32_stays_unit_over_component_sweep() {
        for c in (0..1024).step_by(37) {
            let q = decompress_quat(pack32(c, 512, 512, 3), 0, 0, 2);
            let sum = q[0] * q[0] + q[1] * q[1] + q[2] * q[2];
            if sum <= 1.0 {
                assert!((norm(q) - 1.0).abs() < 1.0e-4, "component {c}: {q:?}");
            }
        }
    }

    #[test]
    fn impossible_inputs_clamp_to_zero_not_nan() {
        // All components at the extremes: q1^2+q2^2+q3^2 > 1
        let q = decompress_quat(pack32(1023, 1023, 1023, 3), 0, 0, 2);
        assert_eq!(q[3], 0.0);
        assert!(q.iter().all(|c| !c.is_nan()));

        let q = decompress_quat(0xFFFFFFFF, 0xFFFFFFFF, 0, 4);
        assert!(q.iter().all(|c| !c.is_nan()));

        let q = decompress_quat(0xFFFF, 0xFFFF, 0xFFFF, 3);
        assert!(q.iter().all(|c| !c.is_nan()));
    }

    #[test]
    fn quat48_order_comes_from_word_low_bits() {
        // Midpoint components; low bits of the first two words form the order
        let mid = 16384u32 << 1;
        let q = decompress_quat(mid | 1, mid | 1, (mid as u16) & !1, 3);
        // order = 0b11 -> reconstructed component lands in w
        assert!((q[3] - 1.0).abs() < 1.0e-4);
    }

    #[test]
    fn quat64_midpoint_is_unit() {
        // raw1 = 1048576 encodes zero: top 21 bits of quat32
        let quat32_word = 1048576u32 << 11 | (1048576u32 >> 10);
        let quat64_word = ((1048576u32 & 0x3FF) << 22) | (524288u32 << 2) | 3;
        let q = decompress_quat(quat32_word, quat64_word, 0, 4);
        assert!((norm(q) - 1.0).abs() < 1.0e-4, "{q:?}");
    }

    #[test]
    fn unknown_quality_yields_identity() {
        assert_eq!(decompress_quat(123, 456, 7, 9), [0.0, 0.0, 0.0, 1.0]);
    }
}
