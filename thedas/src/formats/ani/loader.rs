//! ANI animation decoding
//!
//! An ANI file is a GFF tree whose root carries a name, a duration and a
//! list of track nodes. A track node's name ends in `_rotation` or
//! `_translation`; nodes matching neither suffix are not usable tracks and
//! are skipped. Keyframe payload packing is selected by the node's
//! "target" field, whose own storage width varies between files.

use tracing::{debug, warn};

use super::quat::decompress_quat;
use crate::error::Result;
use crate::formats::gff::{labels, parse_gff_bytes, GffFile, GffStructRef};
use crate::model::{AnimKeyframe, AnimTrack, Animation, TrackKind};

/// Decode an ANI file.
///
/// `source_name` is used as the animation name when the file carries none.
/// Tracks that decode zero keyframes are discarded.
///
/// # Errors
/// Returns an error only for structural GFF failures.
pub fn load_ani(data: Vec<u8>, source_name: &str) -> Result<Animation> {
    let gff = parse_gff_bytes(data)?;

    let mut anim = Animation {
        source_name: source_name.to_string(),
        ..Animation::default()
    };

    anim.name = gff.read_string(0, labels::ANIM_NAME, 0);
    if anim.name.is_empty() {
        anim.name = gff.read_string(0, labels::ANIM_NAME_ALT, 0);
    }
    if anim.name.is_empty() {
        anim.name = source_name.to_string();
    }

    anim.duration = gff.read_f32(0, labels::DURATION, 0);
    if anim.duration <= 0.0 {
        // Never zero: keyframe times are normalized by the duration
        anim.duration = 1.0;
    }

    for node in gff.read_struct_list(0, labels::NODE_LIST, 0) {
        let full_name = gff.read_string(node.struct_index, labels::TRACK_NAME, node.offset);

        let (kind, bone_name) = if let Some(pos) = full_name.find("_rotation") {
            (TrackKind::Rotation, full_name[..pos].to_string())
        } else if let Some(pos) = full_name.find("_translation") {
            (TrackKind::Translation, full_name[..pos].to_string())
        } else {
            debug!(node = %full_name, "skipping ANI node without track suffix");
            continue;
        };

        let target = read_target(&gff, node);

        // Keyframes hang off a struct reference, then a list with the same
        // label on the referenced struct
        let Some(data_ref) = gff.read_struct_ref(node.struct_index, labels::KEY_DATA, node.offset)
        else {
            continue;
        };
        if data_ref == GffStructRef::default() {
            continue;
        }

        let mut track = AnimTrack {
            bone_name,
            bone_index: None,
            kind,
            keyframes: Vec::new(),
        };

        for kf_ref in gff.read_struct_list(data_ref.struct_index, labels::KEY_DATA, data_ref.offset)
        {
            let mut kf = AnimKeyframe::default();

            if let Some(time_field) = gff.find_field(kf_ref.struct_index, labels::KEY_TIME) {
                let raw = gff.u16_at(
                    gff.data_offset() + time_field.data_offset + kf_ref.offset,
                );
                kf.time = f32::from(raw) / 65535.0 * anim.duration;
            }

            let d0 = gff.find_field(kf_ref.struct_index, labels::KEY_DATA0);
            let d1 = gff.find_field(kf_ref.struct_index, labels::KEY_DATA1);
            let d2 = gff.find_field(kf_ref.struct_index, labels::KEY_DATA2);
            let field_pos =
                |f: &crate::formats::gff::GffFieldDef| gff.data_offset() + f.data_offset + kf_ref.offset;

            match kind {
                TrackKind::Rotation => {
                    if let Some(d0) = d0 {
                        let pos = field_pos(d0);
                        kf.value = match target {
                            2 => decompress_quat(gff.u32_at(pos), 0, 0, 2),
                            4 => {
                                // The word labeled for the low half holds the
                                // high bits; pass them swapped
                                let low = gff.u32_at(pos);
                                let high = gff.u32_at(pos + 4);
                                decompress_quat(high, low, 0, 4)
                            }
                            3 => {
                                let q32 = u32::from(gff.u16_at(pos));
                                let q64 = d1.map_or(0, |f| u32::from(gff.u16_at(field_pos(f))));
                                let q48 = d2.map_or(0, |f| gff.u16_at(field_pos(f)));
                                decompress_quat(q32, q64, q48, 3)
                            }
                            _ => [0.0, 0.0, 0.0, 1.0],
                        };
                    }
                }
                TrackKind::Translation => {
                    if target == 6 {
                        if let (Some(d0), Some(d1), Some(d2)) = (d0, d1, d2) {
                            kf.value = [
                                gff.f32_at(field_pos(d0)),
                                gff.f32_at(field_pos(d1)),
                                gff.f32_at(field_pos(d2)),
                                0.0,
                            ];
                        }
                    }
                }
            }

            track.keyframes.push(kf);
        }

        if !track.keyframes.is_empty() {
            anim.tracks.push(track);
        }
    }

    Ok(anim)
}

/// Read a track's "target" field at whatever width its type ID declares.
///
/// Unrecognized type IDs fall back to a width guess: prefer whichever of
/// the 8-bit then 16-bit readings lands in 2..=6, else take the raw 32-bit
/// value. The guess cannot be verified from the data alone and existing
/// files decode only under this exact order; keep it as-is.
fn read_target(gff: &GffFile, node: GffStructRef) -> u32 {
    let Some(field) = gff.find_field(node.struct_index, labels::TRACK_TARGET) else {
        return 2;
    };
    let pos = gff.data_offset() + field.data_offset + node.offset;

    match field.type_id {
        0 => u32::from(gff.u8_at(pos)),
        1 => (gff.u8_at(pos) as i8) as u32,
        2 => u32::from(gff.u16_at(pos)),
        3 => gff.i16_at(pos) as u32,
        4 | 5 => gff.u32_at(pos),
        other => {
            let val8 = u32::from(gff.u8_at(pos));
            let val16 = u32::from(gff.u16_at(pos));
            let val32 = gff.u32_at(pos);
            let guess = if (2..=6).contains(&val8) {
                val8
            } else if (2..=6).contains(&val16) {
                val16
            } else {
                val32
            };
            warn!(
                type_id = other,
                guess, "unrecognized ANI target type ID, guessing width"
            );
            guess
        }
    }
}
