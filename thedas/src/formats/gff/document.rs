//! GFF document structure and field accessors
//!
//! The parsed tree and the raw byte buffer are owned together; all field
//! accessors read directly from the buffer at computed offsets, there is no
//! decoded value cache. Fixed-size scalar reads past the end of the buffer
//! return zero rather than failing - structural bounds are validated once at
//! parse time instead.

use super::labels;

/// GFF field type ID for ECString values.
pub const TYPE_ID_ECSTRING: u16 = 14;
/// GFF field type ID for 32-bit unsigned integers.
pub const TYPE_ID_UINT32: u16 = 4;

/// Field flag bits from the field definition's flags word.
pub struct FieldFlags;

impl FieldFlags {
    /// Bit 15: the field is a list.
    pub const LIST: u16 = 0x8000;
    /// Bit 14: the field is struct-valued.
    pub const STRUCT: u16 = 0x4000;
    /// Bit 13: the field is a reference.
    pub const REFERENCE: u16 = 0x2000;
}

/// The 28-byte GFF file header.
#[derive(Debug, Clone, Copy, Default)]
pub struct GffHeader {
    /// Magic tag, always `"GFF "`.
    pub magic: [u8; 4],
    /// Format version tag (e.g. `"V4.0"`); accepted without validation.
    pub version: u32,
    /// Platform tag; accepted without validation.
    pub platform: u32,
    /// File-type tag (`"MMH "`, `"MESH"`, or a numeric id for ANI/PHY).
    pub file_type: u32,
    /// File-type version tag.
    pub file_version: u32,
    /// Number of struct definitions.
    pub struct_count: u32,
    /// Absolute byte offset of the data section.
    pub data_offset: u32,
}

/// A struct definition from the struct table.
#[derive(Debug, Clone)]
pub struct GffStructDef {
    /// 4-byte struct type tag (e.g. `"node"`, `"shap"`, `"mshh"`).
    pub struct_type: [u8; 4],
    /// Number of fields in this struct's field array.
    pub field_count: u32,
    /// Absolute byte offset of the field array (relative to the file start,
    /// not the data section).
    pub field_offset: u32,
    /// Byte size of one instance, used as the element stride when the
    /// struct is packed into an array-of-structs list.
    pub struct_size: u32,
    /// Parsed field definitions.
    pub fields: Vec<GffFieldDef>,
}

impl GffStructDef {
    /// The struct type tag as a string (lossy for non-ASCII tags).
    pub fn type_tag(&self) -> &str {
        std::str::from_utf8(&self.struct_type).unwrap_or("")
    }
}

/// A field definition from a struct's field array.
#[derive(Debug, Clone, Copy)]
pub struct GffFieldDef {
    /// 32-bit integer label identifying the field's meaning.
    pub label: u32,
    /// Primitive/compound type ID. For fixed-size struct lists this doubles
    /// as the element struct-type index.
    pub type_id: u16,
    /// Flag bits; see [`FieldFlags`].
    pub flags: u16,
    /// Inline data or an offset relative to the data section, depending on
    /// the flags.
    pub data_offset: u32,
}

impl GffFieldDef {
    pub fn is_list(&self) -> bool {
        self.flags & FieldFlags::LIST != 0
    }

    pub fn is_struct(&self) -> bool {
        self.flags & FieldFlags::STRUCT != 0
    }

    pub fn is_reference(&self) -> bool {
        self.flags & FieldFlags::REFERENCE != 0
    }
}

/// Reference to a struct instance: a struct-type index plus a byte offset
/// into the data section where the instance's field data begins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GffStructRef {
    pub struct_index: u32,
    pub offset: u32,
}

/// A parsed GFF file.
///
/// Owns the raw bytes for its whole lifetime; accessors take a struct index,
/// a field label and a base offset so one struct *definition* can be reused
/// for many struct *instances* packed sequentially in the data section.
#[derive(Debug)]
pub struct GffFile {
    pub header: GffHeader,
    pub structs: Vec<GffStructDef>,
    pub(super) data: Vec<u8>,
}

impl GffFile {
    /// The raw file bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Absolute byte offset of the data section.
    pub fn data_offset(&self) -> u32 {
        self.header.data_offset
    }

    /// Whether the header declares an MMH (model hierarchy) file.
    pub fn is_mmh(&self) -> bool {
        self.header.file_type == u32::from_le_bytes(*b"MMH ")
    }

    /// Whether the header declares an MSH (mesh data) file.
    pub fn is_msh(&self) -> bool {
        self.header.file_type == u32::from_le_bytes(*b"MESH")
    }

    // ==================== Raw scalar reads ====================
    // Reads past the end of the buffer return zero; the engine's own reader
    // behaves this way and some shipped files rely on it.

    fn bytes_at<const N: usize>(&self, pos: u32) -> [u8; N] {
        let pos = pos as usize;
        self.data
            .get(pos..pos + N)
            .map_or([0u8; N], |s| s.try_into().unwrap_or([0u8; N]))
    }

    pub fn u8_at(&self, pos: u32) -> u8 {
        self.bytes_at::<1>(pos)[0]
    }

    pub fn u16_at(&self, pos: u32) -> u16 {
        u16::from_le_bytes(self.bytes_at(pos))
    }

    pub fn i16_at(&self, pos: u32) -> i16 {
        i16::from_le_bytes(self.bytes_at(pos))
    }

    pub fn u32_at(&self, pos: u32) -> u32 {
        u32::from_le_bytes(self.bytes_at(pos))
    }

    pub fn i32_at(&self, pos: u32) -> i32 {
        i32::from_le_bytes(self.bytes_at(pos))
    }

    pub fn f32_at(&self, pos: u32) -> f32 {
        f32::from_le_bytes(self.bytes_at(pos))
    }

    // ==================== Field lookup ====================

    /// Find a field by label in a struct's field list.
    ///
    /// Returns `None` for out-of-range struct indices and for absent labels;
    /// many fields are optional and absence is an expected outcome.
    pub fn find_field(&self, struct_index: u32, label: u32) -> Option<&GffFieldDef> {
        self.structs
            .get(struct_index as usize)?
            .fields
            .iter()
            .find(|f| f.label == label)
    }

    /// Absolute data position of a field instance.
    fn field_data_pos(&self, field: &GffFieldDef, base_offset: u32) -> u32 {
        self.header
            .data_offset
            .wrapping_add(field.data_offset)
            .wrapping_add(base_offset)
    }

    // ==================== Typed field reads ====================

    /// Read an ECString field (type ID 14): a data-section offset to a
    /// 4-byte character count followed by 2-byte code units, of which only
    /// the low byte is kept. A negative offset means "no string".
    pub fn read_string(&self, struct_index: u32, label: u32, base_offset: u32) -> String {
        let Some(field) = self.find_field(struct_index, label) else {
            return String::new();
        };
        if field.type_id != TYPE_ID_ECSTRING {
            return String::new();
        }

        let str_offset = self.i32_at(self.field_data_pos(field, base_offset));
        if str_offset < 0 {
            return String::new();
        }

        let mut pos = self.header.data_offset.wrapping_add(str_offset as u32);
        let length = self.u32_at(pos);
        pos += 4;

        let mut result = String::with_capacity(length.min(4096) as usize);
        for _ in 0..length {
            if pos as usize + 1 >= self.data.len() {
                break;
            }
            let c = self.data[pos as usize];
            pos += 2;
            if c != 0 {
                result.push(c as char);
            }
        }
        result
    }

    pub fn read_i32(&self, struct_index: u32, label: u32, base_offset: u32) -> i32 {
        self.find_field(struct_index, label)
            .map_or(0, |f| self.i32_at(self.field_data_pos(f, base_offset)))
    }

    pub fn read_u32(&self, struct_index: u32, label: u32, base_offset: u32) -> u32 {
        self.find_field(struct_index, label)
            .map_or(0, |f| self.u32_at(self.field_data_pos(f, base_offset)))
    }

    pub fn read_f32(&self, struct_index: u32, label: u32, base_offset: u32) -> f32 {
        self.find_field(struct_index, label)
            .map_or(0.0, |f| self.f32_at(self.field_data_pos(f, base_offset)))
    }

    /// Read `N` consecutive floats of a vector-valued field (translations,
    /// rotations, box extents), or `None` when the label is absent.
    pub fn read_f32_array<const N: usize>(
        &self,
        struct_index: u32,
        label: u32,
        base_offset: u32,
    ) -> Option<[f32; N]> {
        let field = self.find_field(struct_index, label)?;
        let pos = self.field_data_pos(field, base_offset);
        let mut out = [0.0f32; N];
        for (i, v) in out.iter_mut().enumerate() {
            *v = self.f32_at(pos + i as u32 * 4);
        }
        Some(out)
    }

    /// Read a single struct reference: 2-byte struct index, 2 bytes of
    /// unused flags, 4-byte data-section offset. Only meaningful when the
    /// reference flag is set and the list flag is clear.
    pub fn read_struct_ref(
        &self,
        struct_index: u32,
        label: u32,
        base_offset: u32,
    ) -> Option<GffStructRef> {
        let field = self.find_field(struct_index, label)?;
        if !field.is_reference() || field.is_list() {
            return None;
        }

        let pos = self.field_data_pos(field, base_offset);
        Some(GffStructRef {
            struct_index: u32::from(self.u16_at(pos)),
            offset: self.u32_at(pos + 4),
        })
    }

    /// Read a struct list field.
    ///
    /// Three layouts are selected by the list/struct/reference flags:
    /// - list+struct: count-prefixed contiguous run of fixed-size instances,
    ///   stride taken from the element struct-type's declared size;
    /// - list+struct+reference: count-prefixed run of 4-byte offsets, one
    ///   per instance;
    /// - list+reference: count-prefixed run of (index, flags, offset)
    ///   triples referencing arbitrary structs.
    ///
    /// Any other flag combination yields an empty list.
    pub fn read_struct_list(
        &self,
        struct_index: u32,
        label: u32,
        base_offset: u32,
    ) -> Vec<GffStructRef> {
        let Some(field) = self.find_field(struct_index, label) else {
            return Vec::new();
        };

        let data_pos = self.field_data_pos(field, base_offset);
        let list_ref = self.i32_at(data_pos);
        if list_ref < 0 {
            return Vec::new();
        }

        let mut list_pos = self.header.data_offset.wrapping_add(list_ref as u32);
        let count = self.u32_at(list_pos);
        list_pos += 4;

        // A corrupt count cannot describe more elements than the buffer holds
        let remaining = (self.data.len() as u32).saturating_sub(list_pos);

        let mut result = Vec::new();
        if field.is_list() && field.is_struct() && !field.is_reference() {
            // Contiguous array of struct instances
            let elem_index = u32::from(field.type_id);
            let Some(elem_def) = self.structs.get(elem_index as usize) else {
                return Vec::new();
            };
            let stride = elem_def.struct_size;
            let count = count.min(remaining / stride.max(1));
            let mut item_offset = (list_ref as u32) + 4;
            for _ in 0..count {
                result.push(GffStructRef {
                    struct_index: elem_index,
                    offset: item_offset,
                });
                item_offset = item_offset.wrapping_add(stride);
            }
        } else if field.is_list() && field.is_struct() && field.is_reference() {
            // Run of per-instance offsets
            for _ in 0..count.min(remaining / 4) {
                let item_offset = self.u32_at(list_pos);
                list_pos += 4;
                result.push(GffStructRef {
                    struct_index: u32::from(field.type_id),
                    offset: item_offset,
                });
            }
        } else if field.is_list() && field.is_reference() && !field.is_struct() {
            // Run of typed references
            for _ in 0..count.min(remaining / 8) {
                let item_index = self.u16_at(list_pos);
                let item_offset = self.u32_at(list_pos + 4);
                list_pos += 8;
                result.push(GffStructRef {
                    struct_index: u32::from(item_index),
                    offset: item_offset,
                });
            }
        }

        result
    }

    /// Read a flat list of `u32` values (type ID 4, no struct/ref flags).
    pub fn read_u32_list(&self, struct_index: u32, label: u32, base_offset: u32) -> Vec<u32> {
        let Some(field) = self.find_field(struct_index, label) else {
            return Vec::new();
        };
        if !field.is_list() || field.is_struct() || field.is_reference() {
            return Vec::new();
        }
        if field.type_id != TYPE_ID_UINT32 {
            return Vec::new();
        }

        let list_ref = self.i32_at(self.field_data_pos(field, base_offset));
        if list_ref < 0 {
            return Vec::new();
        }

        let mut list_pos = self.header.data_offset.wrapping_add(list_ref as u32);
        let count = self.u32_at(list_pos);
        list_pos += 4;

        let remaining = (self.data.len() as u32).saturating_sub(list_pos);
        let count = count.min(remaining / 4);

        let mut result = Vec::with_capacity(count as usize);
        for _ in 0..count {
            result.push(self.u32_at(list_pos));
            list_pos += 4;
        }
        result
    }

    /// Data-section offset of a list field's payload (used for the raw
    /// vertex/index buffer blobs), or 0 for absent/null fields.
    pub fn list_data_offset(&self, struct_index: u32, label: u32, base_offset: u32) -> u32 {
        let Some(field) = self.find_field(struct_index, label) else {
            return 0;
        };
        let list_ref = self.i32_at(self.field_data_pos(field, base_offset));
        if list_ref < 0 {
            return 0;
        }
        list_ref as u32
    }

    /// The generic child-struct list most tree nodes carry.
    pub fn children(&self, struct_index: u32, base_offset: u32) -> Vec<GffStructRef> {
        self.read_struct_list(struct_index, labels::CHILDREN, base_offset)
    }
}
