//! Synthetic GFF buffer builder shared by the integration tests
//!
//! Builds byte-exact GFF containers: 28-byte header, 16-byte struct
//! definitions, 12-byte field definitions, then the data section. Tests
//! lay out the data section through the `put_*` helpers, which return the
//! data-relative offsets that field definitions and references point at.

#![allow(dead_code)]

pub struct FieldSpec {
    pub label: u32,
    pub type_id: u16,
    pub flags: u16,
    pub data_offset: u32,
}

pub struct StructSpec {
    pub tag: [u8; 4],
    pub struct_size: u32,
    pub fields: Vec<FieldSpec>,
}

pub struct GffBuilder {
    pub file_type: [u8; 4],
    pub structs: Vec<StructSpec>,
    pub data: Vec<u8>,
}

pub const FLAG_LIST: u16 = 0x8000;
pub const FLAG_STRUCT: u16 = 0x4000;
pub const FLAG_REFERENCE: u16 = 0x2000;

impl GffBuilder {
    pub fn new(file_type: &[u8; 4]) -> Self {
        Self {
            file_type: *file_type,
            structs: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Declare a struct type; returns its index.
    pub fn add_struct(&mut self, tag: &[u8; 4], struct_size: u32) -> u16 {
        self.structs.push(StructSpec {
            tag: *tag,
            struct_size,
            fields: Vec::new(),
        });
        (self.structs.len() - 1) as u16
    }

    pub fn add_field(
        &mut self,
        struct_index: u16,
        label: u32,
        type_id: u16,
        flags: u16,
        data_offset: u32,
    ) {
        self.structs[struct_index as usize].fields.push(FieldSpec {
            label,
            type_id,
            flags,
            data_offset,
        });
    }

    /// Current write position in the data section.
    pub fn pos(&self) -> u32 {
        self.data.len() as u32
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) -> u32 {
        let at = self.pos();
        self.data.extend_from_slice(bytes);
        at
    }

    pub fn put_u8(&mut self, v: u8) -> u32 {
        self.put_bytes(&[v])
    }

    pub fn put_u16(&mut self, v: u16) -> u32 {
        self.put_bytes(&v.to_le_bytes())
    }

    pub fn put_u32(&mut self, v: u32) -> u32 {
        self.put_bytes(&v.to_le_bytes())
    }

    pub fn put_i32(&mut self, v: i32) -> u32 {
        self.put_bytes(&v.to_le_bytes())
    }

    pub fn put_f32(&mut self, v: f32) -> u32 {
        self.put_bytes(&v.to_le_bytes())
    }

    /// Write an ECString payload (4-byte count + 2-byte code units) and
    /// return its data-relative offset for a string field to point at.
    pub fn put_string(&mut self, s: &str) -> u32 {
        let at = self.put_u32(s.len() as u32);
        for b in s.bytes() {
            self.put_u16(u16::from(b));
        }
        at
    }

    pub fn build(self) -> Vec<u8> {
        let struct_table_size = self.structs.len() * 16;
        let field_count: usize = self.structs.iter().map(|s| s.fields.len()).sum();
        let data_offset = 28 + struct_table_size + field_count * 12;

        let mut out = Vec::with_capacity(data_offset + self.data.len());
        out.extend_from_slice(b"GFF ");
        out.extend_from_slice(b"V4.0");
        out.extend_from_slice(b"PC  ");
        out.extend_from_slice(&self.file_type);
        out.extend_from_slice(b"V0.1");
        out.extend_from_slice(&(self.structs.len() as u32).to_le_bytes());
        out.extend_from_slice(&(data_offset as u32).to_le_bytes());

        // Struct definitions, field arrays packed right after the table
        let mut field_offset = 28 + struct_table_size;
        for spec in &self.structs {
            out.extend_from_slice(&spec.tag);
            out.extend_from_slice(&(spec.fields.len() as u32).to_le_bytes());
            out.extend_from_slice(&(field_offset as u32).to_le_bytes());
            out.extend_from_slice(&spec.struct_size.to_le_bytes());
            field_offset += spec.fields.len() * 12;
        }

        for spec in &self.structs {
            for field in &spec.fields {
                out.extend_from_slice(&field.label.to_le_bytes());
                out.extend_from_slice(&field.type_id.to_le_bytes());
                out.extend_from_slice(&field.flags.to_le_bytes());
                out.extend_from_slice(&field.data_offset.to_le_bytes());
            }
        }

        out.extend_from_slice(&self.data);
        out
    }
}
