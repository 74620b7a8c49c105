//! Camera-raw-settings (`crs:`) XMP presets.
//!
//! ```text
//! <?xpacket begin="\u{feff}" id="W5M0MpCehiHzreSzNTczkc9d"?>
//! <x:xmpmeta xmlns:x="adobe:ns:meta/">
//!  <rdf:RDF xmlns:rdf="...">
//!   <rdf:Description rdf:about="" xmlns:crs="..." crs:PresetType="Normal" ...>
//!    <crs:Name><rdf:Alt><rdf:li xml:lang="x-default">NAME</rdf:li></rdf:Alt></crs:Name>
//!    <crs:ToneCurvePV2012><rdf:Seq><rdf:li>0, 0</rdf:li>...</rdf:Seq></crs:ToneCurvePV2012>
//!    <crs:ToneCurvePV2012Red>...  Green, Blue
//!   </rdf:Description>
//!  </rdf:RDF>
//! </x:xmpmeta>
//! <?xpacket end="w"?>
//! ```
//!
//! Properties are emitted in a fixed order and the `crs:UUID` is a v5 UUID
//! of the settings, curves and name, so the same `(delta, name)` always renders to
//! the same bytes.

use std::io::Write;
use std::path::Path;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesPI, BytesStart, BytesText, Event};
use uuid::Uuid;

use super::curves::{CurvePoint, ToneCurves};
use super::delta::{PresetDelta, Tint};
use crate::error::{GradeError, Result};
use crate::stats::HueBand;

const XPACKET_ID: &str = "W5M0MpCehiHzreSzNTczkc9d";
const NS_X: &str = "adobe:ns:meta/";
const NS_RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
const NS_CRS: &str = "http://ns.adobe.com/camera-raw-settings/1.0/";
const XMP_TOOLKIT: &str = "Adobe XMP Core 7.0-c000 1.000000";
const CRS_VERSION: &str = "18.1";
const CRS_COMPATIBLE_VERSION: &str = "285212672";
const CRS_PROCESS_VERSION: &str = "15.4";

/// Ordered `crs:` properties for `delta`, excluding `crs:UUID`.
pub fn settings(delta: &PresetDelta) -> Vec<(String, String)> {
    let mut props: Vec<(String, String)> = Vec::with_capacity(64);
    let mut put = |key: &str, value: String| props.push((format!("crs:{key}"), value));

    put("PresetType", "Normal".into());
    put("Cluster", String::new());
    put("SupportsAmount", "False".into());
    put("SupportsColor", "True".into());
    put("SupportsMonochrome", "True".into());
    put("Version", CRS_VERSION.into());
    put("CompatibleVersion", CRS_COMPATIBLE_VERSION.into());
    put("ProcessVersion", CRS_PROCESS_VERSION.into());

    let tone = &delta.tone;
    put("Exposure2012", signed_2dp(tone.exposure));
    put("Contrast2012", signed_int(tone.contrast));
    put("Highlights2012", signed_int(tone.highlights));
    put("Shadows2012", signed_int(tone.shadows));
    put("Whites2012", signed_int(tone.whites));
    put("Blacks2012", signed_int(tone.blacks));
    put("Texture", signed_int(tone.texture));
    put("Clarity2012", signed_int(tone.clarity));
    put("Dehaze", signed_int(tone.dehaze));
    put("Vibrance", signed_int(tone.vibrance));
    put("Saturation", signed_int(tone.saturation));

    let curve = &delta.curves.parametric;
    put("ParametricShadows", curve.shadows.to_string());
    put("ParametricDarks", curve.darks.to_string());
    put("ParametricLights", curve.lights.to_string());
    put("ParametricHighlights", curve.highlights.to_string());
    put("ParametricShadowSplit", curve.shadow_split.to_string());
    put("ParametricMidtoneSplit", curve.midtone_split.to_string());
    put("ParametricHighlightSplit", curve.highlight_split.to_string());

    for (zone, tint) in [("Shadow", delta.shadow_tint), ("Highlight", delta.highlight_tint)] {
        let (hue, sat) = tint_values(tint);
        put(&format!("SplitToning{zone}Hue"), hue);
        put(&format!("SplitToning{zone}Saturation"), sat);
    }
    put("SplitToningBalance", "0".into());

    let (hue, sat) = tint_values(delta.midtone_tint);
    put("ColorGradeMidtoneHue", hue);
    put("ColorGradeMidtoneSat", sat);
    put("ColorGradeShadowLum", "0".into());
    put("ColorGradeMidtoneLum", "0".into());
    put("ColorGradeHighlightLum", "0".into());
    put("ColorGradeBlending", "50".into());

    for band in HueBand::ALL {
        put(&format!("HueAdjustment{}", band.name()), delta.hsl(band).hue.to_string());
    }
    for band in HueBand::ALL {
        put(&format!("SaturationAdjustment{}", band.name()), delta.hsl(band).saturation.to_string());
    }
    for band in HueBand::ALL {
        put(&format!("LuminanceAdjustment{}", band.name()), delta.hsl(band).luminance.to_string());
    }

    put("ToneCurveName2012", "Custom".into());
    put("HasSettings", "True".into());
    props
}

/// Point curves as `(element, ["x, y", ...])`, in document order.
pub fn curve_sequences(curves: &ToneCurves) -> Vec<(&'static str, Vec<String>)> {
    let points = |pts: &[CurvePoint]| -> Vec<String> {
        pts.iter().map(|[x, y]| format!("{x}, {y}")).collect()
    };
    vec![
        ("crs:ToneCurvePV2012", points(&curves.master)),
        ("crs:ToneCurvePV2012Red", points(&curves.red)),
        ("crs:ToneCurvePV2012Green", points(&curves.green)),
        ("crs:ToneCurvePV2012Blue", points(&curves.blue)),
    ]
}

/// Deterministic preset UUID: v5 over the rendered settings and the name.
pub fn preset_uuid(settings: &[(String, String)], name: &str) -> String {
    let mut seed = Vec::new();
    for (key, value) in settings {
        seed.extend_from_slice(key.as_bytes());
        seed.push(b'=');
        seed.extend_from_slice(value.as_bytes());
        seed.push(b'\n');
    }
    seed.extend_from_slice(name.as_bytes());
    Uuid::new_v5(&Uuid::NAMESPACE_OID, &seed)
        .simple()
        .to_string()
        .to_ascii_uppercase()
}

/// Render the preset document.
pub fn render(delta: &PresetDelta, name: &str) -> Result<Vec<u8>> {
    let props = settings(delta);
    let sequences = curve_sequences(&delta.curves);
    let mut seed = props.clone();
    seed.extend(
        sequences
            .iter()
            .map(|(element, points)| (element.to_string(), points.join("; "))),
    );
    let uuid = preset_uuid(&seed, name);

    let mut xml = Writer::new_with_indent(Vec::new(), b' ', 1);

    emit(
        &mut xml,
        Event::PI(BytesPI::new(format!(
            "xpacket begin=\"\u{feff}\" id=\"{XPACKET_ID}\""
        ))),
    )?;

    let mut meta = BytesStart::new("x:xmpmeta");
    meta.push_attribute(("xmlns:x", NS_X));
    meta.push_attribute(("x:xmptk", XMP_TOOLKIT));
    emit(&mut xml, Event::Start(meta))?;

    let mut rdf = BytesStart::new("rdf:RDF");
    rdf.push_attribute(("xmlns:rdf", NS_RDF));
    emit(&mut xml, Event::Start(rdf))?;

    let mut desc = BytesStart::new("rdf:Description");
    desc.push_attribute(("rdf:about", ""));
    desc.push_attribute(("xmlns:crs", NS_CRS));
    // PresetType and Cluster lead, the UUID follows them.
    let (head, tail) = props.split_at(2.min(props.len()));
    for (key, value) in head {
        desc.push_attribute((key.as_str(), value.as_str()));
    }
    desc.push_attribute(("crs:UUID", uuid.as_str()));
    for (key, value) in tail {
        desc.push_attribute((key.as_str(), value.as_str()));
    }
    emit(&mut xml, Event::Start(desc))?;

    emit(&mut xml, Event::Start(BytesStart::new("crs:Name")))?;
    emit(&mut xml, Event::Start(BytesStart::new("rdf:Alt")))?;
    let mut li = BytesStart::new("rdf:li");
    li.push_attribute(("xml:lang", "x-default"));
    emit(&mut xml, Event::Start(li))?;
    emit(&mut xml, Event::Text(BytesText::new(name)))?;
    emit(&mut xml, Event::End(BytesEnd::new("rdf:li")))?;
    emit(&mut xml, Event::End(BytesEnd::new("rdf:Alt")))?;
    emit(&mut xml, Event::End(BytesEnd::new("crs:Name")))?;

    for (element, points) in &sequences {
        emit(&mut xml, Event::Start(BytesStart::new(*element)))?;
        emit(&mut xml, Event::Start(BytesStart::new("rdf:Seq")))?;
        for point in points {
            emit(&mut xml, Event::Start(BytesStart::new("rdf:li")))?;
            emit(&mut xml, Event::Text(BytesText::new(point)))?;
            emit(&mut xml, Event::End(BytesEnd::new("rdf:li")))?;
        }
        emit(&mut xml, Event::End(BytesEnd::new("rdf:Seq")))?;
        emit(&mut xml, Event::End(BytesEnd::new(*element)))?;
    }

    emit(&mut xml, Event::End(BytesEnd::new("rdf:Description")))?;
    emit(&mut xml, Event::End(BytesEnd::new("rdf:RDF")))?;
    emit(&mut xml, Event::End(BytesEnd::new("x:xmpmeta")))?;
    emit(&mut xml, Event::PI(BytesPI::new("xpacket end=\"w\"")))?;

    let mut bytes = xml.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

/// Render and write the preset to `path` atomically.
pub fn write(delta: &PresetDelta, name: &str, path: &Path) -> Result<()> {
    let bytes = render(delta, name)?;
    crate::atomic::write_bytes(path, "writing preset", &bytes)?;
    tracing::info!(path = %path.display(), name, "wrote XMP preset");
    Ok(())
}

fn emit<W: Write>(xml: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    xml.write_event(event)
        .map_err(|e| GradeError::format("xmp", e.to_string()))
}

fn tint_values(tint: Tint) -> (String, String) {
    let hue = (tint.hue.round() as i64).rem_euclid(360);
    let sat = tint.saturation.round() as i64;
    (hue.to_string(), sat.to_string())
}

/// `+0.12` / `-0.40`, never `-0.00`.
fn signed_2dp(v: f64) -> String {
    let v = (v * 100.0).round() / 100.0;
    let v = if v == 0.0 { 0.0 } else { v };
    format!("{v:+.2}")
}

/// `+12` / `-7` / `0`.
fn signed_int(v: f64) -> String {
    let v = v.round() as i64;
    if v > 0 { format!("+{v}") } else { v.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::curves::ParametricCurve;
    use crate::preset::delta::{HslOffset, ToneDelta};

    fn sample_delta() -> PresetDelta {
        let mut hsl = [HslOffset::default(); 8];
        hsl[HueBand::Orange.index()] = HslOffset {
            hue: -7,
            saturation: 12,
            luminance: 4,
        };
        PresetDelta {
            tone: ToneDelta {
                exposure: 0.123,
                contrast: -14.6,
                highlights: 22.0,
                shadows: 0.0,
                clarity: -8.4,
                vibrance: 15.0,
                ..ToneDelta::default()
            },
            shadow_tint: Tint {
                hue: 212.4,
                saturation: 18.2,
            },
            highlight_tint: Tint::NONE,
            midtone_tint: Tint {
                hue: 359.7,
                saturation: 6.0,
            },
            hsl,
            curves: ToneCurves {
                parametric: ParametricCurve {
                    darks: -6,
                    ..ParametricCurve::NEUTRAL
                },
                red: [[0, 0], [25, 29], [128, 130], [200, 200], [255, 255]],
                ..ToneCurves::IDENTITY
            },
        }
    }

    fn render_str(delta: &PresetDelta, name: &str) -> String {
        String::from_utf8(render(delta, name).unwrap()).unwrap()
    }

    #[test]
    fn test_document_frame() {
        let text = render_str(&sample_delta(), "Teal Shadows");
        assert!(text.starts_with("<?xpacket begin=\"\u{feff}\" id=\"W5M0MpCehiHzreSzNTczkc9d\"?>"));
        assert!(text.trim_end().ends_with("<?xpacket end=\"w\"?>"));
        assert!(text.contains("xmlns:crs=\"http://ns.adobe.com/camera-raw-settings/1.0/\""));
        assert!(text.contains("<rdf:li xml:lang=\"x-default\">Teal Shadows</rdf:li>"));
    }

    #[test]
    fn test_values_are_formatted() {
        let text = render_str(&sample_delta(), "p");
        assert!(text.contains("crs:PresetType=\"Normal\""));
        assert!(text.contains("crs:Exposure2012=\"+0.12\""));
        assert!(text.contains("crs:Contrast2012=\"-15\""));
        assert!(text.contains("crs:Highlights2012=\"+22\""));
        assert!(text.contains("crs:Shadows2012=\"0\""));
        assert!(text.contains("crs:SplitToningShadowHue=\"212\""));
        assert!(text.contains("crs:SplitToningShadowSaturation=\"18\""));
        assert!(text.contains("crs:SplitToningHighlightSaturation=\"0\""));
        assert!(text.contains("crs:ColorGradeMidtoneHue=\"0\""));
        assert!(text.contains("crs:HueAdjustmentOrange=\"-7\""));
        assert!(text.contains("crs:SaturationAdjustmentOrange=\"12\""));
        assert!(text.contains("crs:LuminanceAdjustmentMagenta=\"0\""));
        assert!(text.contains("crs:Clarity2012=\"-8\""));
        assert!(text.contains("crs:Vibrance=\"+15\""));
        assert!(text.contains("crs:Whites2012=\"0\""));
        assert!(text.contains("crs:ParametricDarks=\"-6\""));
        assert!(text.contains("crs:ParametricMidtoneSplit=\"50\""));
        assert!(text.contains("crs:ToneCurveName2012=\"Custom\""));
    }

    #[test]
    fn test_curves_follow_the_name() {
        let text = render_str(&sample_delta(), "p");
        let name = text.find("</crs:Name>").unwrap();
        let master = text.find("<crs:ToneCurvePV2012>").unwrap();
        let red = text.find("<crs:ToneCurvePV2012Red>").unwrap();
        let green = text.find("<crs:ToneCurvePV2012Green>").unwrap();
        let blue = text.find("<crs:ToneCurvePV2012Blue>").unwrap();
        assert!(name < master && master < red && red < green && green < blue);
        assert!(blue < text.find("</rdf:Description>").unwrap());

        let red_seq = &text[red..green];
        assert!(red_seq.contains("<rdf:Seq>"));
        assert!(red_seq.contains("<rdf:li>25, 29</rdf:li>"));
        assert!(red_seq.contains("<rdf:li>128, 130</rdf:li>"));
        assert_eq!(red_seq.matches("<rdf:li>").count(), 5);
        assert!(text[master..red].contains("<rdf:li>63, 63</rdf:li>"));
        assert_eq!(text[master..red].matches("<rdf:li>").count(), 4);
    }

    #[test]
    fn test_uuid_covers_curves() {
        let delta = sample_delta();
        let mut other = delta.clone();
        other.curves.blue[2] = [128, 120];
        let uuid = |d: &PresetDelta| {
            let text = String::from_utf8(render(d, "same").unwrap()).unwrap();
            let start = text.find("crs:UUID=\"").unwrap() + "crs:UUID=\"".len();
            text[start..start + 32].to_string()
        };
        assert_ne!(uuid(&delta), uuid(&other));
    }

    #[test]
    fn test_every_band_is_written() {
        let text = render_str(&sample_delta(), "p");
        for band in HueBand::ALL {
            for kind in ["Hue", "Saturation", "Luminance"] {
                let key = format!("crs:{kind}Adjustment{}=", band.name());
                assert_eq!(text.matches(&key).count(), 1, "{key}");
            }
        }
    }

    #[test]
    fn test_name_is_escaped() {
        let text = render_str(&sample_delta(), "Fade <soft> & \"warm\"");
        assert!(text.contains("Fade &lt;soft"), "{text}");
        assert!(text.contains("&amp;"), "{text}");
        assert!(!text.contains("<soft>"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let delta = sample_delta();
        assert_eq!(render(&delta, "same").unwrap(), render(&delta, "same").unwrap());
    }

    #[test]
    fn test_uuid_depends_on_content_and_name() {
        let delta = sample_delta();
        let props = settings(&delta);
        let a = preset_uuid(&props, "one");
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
        assert_ne!(a, preset_uuid(&props, "two"));

        let mut other = delta.clone();
        other.tone.exposure = -1.0;
        assert_ne!(a, preset_uuid(&settings(&other), "one"));
    }

    #[test]
    fn test_signed_formatting() {
        assert_eq!(signed_2dp(-0.001), "+0.00");
        assert_eq!(signed_2dp(1.005_1), "+1.01");
        assert_eq!(signed_2dp(-0.4), "-0.40");
        assert_eq!(signed_int(-0.2), "0");
        assert_eq!(signed_int(3.6), "+4");
    }

    #[test]
    fn test_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("look.xmp");
        write(&sample_delta(), "look", &path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), render(&sample_delta(), "look").unwrap());
    }
}
