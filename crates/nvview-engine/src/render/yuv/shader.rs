//! WGSL program sources for each pixel format.
//!
//! Both variants come from one template; only the chroma swizzle differs.

use super::PixelFormat;

const PROGRAM_TEMPLATE: &str = include_str!("shaders/yuv.wgsl");
const SWIZZLE_PLACEHOLDER: &str = "CHROMA_SWIZZLE";

/// `Rg8Unorm` stores the first chroma byte in `r`, the second in `g`.
fn chroma_swizzle(format: PixelFormat) -> &'static str {
    match format {
        PixelFormat::Nv12 => "rg",
        PixelFormat::Nv21 => "gr",
    }
}

/// Full WGSL source of the program used for `format`.
pub fn program_source(format: PixelFormat) -> String {
    PROGRAM_TEMPLATE.replace(SWIZZLE_PLACEHOLDER, chroma_swizzle(format))
}

/// Parses and validates a WGSL program.
///
/// On failure the returned string is the diagnostic text, ready for logging.
pub fn validate_program(source: &str) -> Result<(), String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    );
    validator
        .validate(&module)
        .map_err(|e| format!("{e:?}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_programs_validate() {
        for format in [PixelFormat::Nv21, PixelFormat::Nv12] {
            let source = program_source(format);
            if let Err(log) = validate_program(&source) {
                panic!("{format} program failed validation:\n{log}");
            }
        }
    }

    #[test]
    fn placeholder_is_substituted() {
        let nv21 = program_source(PixelFormat::Nv21);
        let nv12 = program_source(PixelFormat::Nv12);
        assert!(!nv21.contains(SWIZZLE_PLACEHOLDER));
        assert!(nv21.contains(".gr - vec2<f32>"));
        assert!(nv12.contains(".rg - vec2<f32>"));
    }

    #[test]
    fn broken_program_reports_diagnostic() {
        let log = validate_program("@fragment fn fs_main() -> @location(0) vec4<f32> { return x; }")
            .unwrap_err();
        assert!(!log.is_empty());
    }
}
