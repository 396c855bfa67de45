//! MAO material description parsing
//!
//! A `.mao` file is a plain-text XML material object. Only its `<Texture>`
//! elements matter here: each names a sampler (`Name`) and a texture
//! resource (`ResName`), and the sampler name's substrings decide which
//! slot of the [`Material`] the resource fills. No texture data is decoded.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::Result;
use crate::model::Material;

/// Parse a MAO document into a material binding.
///
/// # Errors
/// Returns an error if the XML is unreadable.
pub fn parse_mao(content: &str, material_name: &str) -> Result<Material> {
    let mut material = Material {
        name: material_name.to_string(),
        ..Material::default()
    };

    let mut reader = Reader::from_str(content);
    reader.trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"Texture" => {
                apply_texture(&e, &mut material)?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(material)
}

fn apply_texture(element: &BytesStart, material: &mut Material) -> Result<()> {
    let mut tex_name = String::new();
    let mut res_name = String::new();

    for attr in element.attributes() {
        let attr = attr.map_err(|e| crate::error::Error::MaoParse(e.to_string()))?;
        let value = attr.unescape_value()?.into_owned();
        match attr.key.as_ref() {
            b"Name" => tex_name = value,
            b"ResName" => res_name = value,
            _ => {}
        }
    }

    if tex_name.is_empty() || res_name.is_empty() {
        return Ok(());
    }

    let name_lower = tex_name.to_ascii_lowercase();
    if name_lower.contains("diffuse")
        || name_lower.contains("packedtexture")
        || name_lower.contains("_d")
    {
        material.diffuse_map = res_name;
    } else if name_lower.contains("normal") || name_lower.contains("_n") {
        material.normal_map = res_name;
    } else if name_lower.contains("specular") || name_lower.contains("_s") {
        material.specular_map = res_name;
    } else if name_lower.contains("tintmask") {
        // Tint masks are not tint maps; ignored
    } else if name_lower.contains("tint") {
        material.tint_map = res_name;
    } else if material.diffuse_map.is_empty() {
        // Sampler name tells us nothing; fall back to the resource name
        let res_lower = res_name.to_ascii_lowercase();
        if res_lower.contains("_d.") || res_lower.contains("0d.") || res_lower.contains("_d_") {
            material.diffuse_map = res_name;
        } else if res_lower.contains("_n.") || res_lower.contains("0n.") {
            material.normal_map = res_name;
        } else if res_lower.contains("_s.") || res_lower.contains("0s.") {
            material.specular_map = res_name;
        } else if res_lower.contains("_t.") || res_lower.contains("0t.") {
            material.tint_map = res_name;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn classifies_by_sampler_name() {
        let mao = r#"<MaterialObject Name="c_test">
            <Material Name="Character.mat"/>
            <Texture Name="mml_tDiffuse" ResName="c_test_0d.dds"/>
            <Texture Name="mml_tNormalMap" ResName="c_test_0n.dds"/>
            <Texture Name="mml_tSpecularMask" ResName="c_test_0s.dds"/>
            <Texture Name="mml_tTintMask" ResName="c_test_0t.dds"/>
        </MaterialObject>"#;
        let mat = parse_mao(mao, "c_test").unwrap();
        assert_eq!(mat.name, "c_test");
        assert_eq!(mat.diffuse_map, "c_test_0d.dds");
        assert_eq!(mat.normal_map, "c_test_0n.dds");
        assert_eq!(mat.specular_map, "c_test_0s.dds");
        // A tint *mask* is not a tint map
        assert_eq!(mat.tint_map, "");
    }

    #[test]
    fn falls_back_to_resource_name_suffix() {
        let mao = r#"<MaterialObject>
            <Texture Name="mml_tPacked" ResName="w_axe_0d.dds"/>
        </MaterialObject>"#;
        let mat = parse_mao(mao, "w_axe").unwrap();
        assert_eq!(mat.diffuse_map, "w_axe_0d.dds");
    }

    #[test]
    fn ignores_textures_without_resname() {
        let mao = r#"<MaterialObject><Texture Name="mml_tDiffuse"/></MaterialObject>"#;
        let mat = parse_mao(mao, "m").unwrap();
        assert_eq!(mat.diffuse_map, "");
    }
}
