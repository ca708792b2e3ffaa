// Event-stream XML edits: only the touched nodes are re-serialized, every
// other event (comments, doctype, whitespace) is written through untouched.
// ref: quick-xml — https://docs.rs/quick-xml/

use anyhow::Result;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use crate::model::color::{storyboard_float, Color};

pub fn attr_value(elem: &BytesStart, key: &str) -> Option<String> {
    elem.try_get_attribute(key)
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Copy of `elem` with `sets` applied: existing attributes keep their
/// position, new ones are appended.
pub fn with_attributes(elem: &BytesStart, sets: &[(&str, &str)]) -> BytesStart<'static> {
    let name = String::from_utf8_lossy(elem.name().as_ref()).into_owned();
    let mut out = BytesStart::new(name);
    let mut seen = vec![false; sets.len()];
    for attr in elem.attributes().flatten() {
        match sets.iter().position(|(k, _)| k.as_bytes() == attr.key.as_ref()) {
            Some(i) => {
                seen[i] = true;
                out.push_attribute(sets[i]);
            }
            None => out.push_attribute(attr),
        }
    }
    for (i, set) in sets.iter().enumerate() {
        if !seen[i] { out.push_attribute(*set); }
    }
    out
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String> {
    Ok(String::from_utf8(writer.into_inner())?)
}

fn is(elem: &BytesStart, name: &str) -> bool {
    elem.name().as_ref() == name.as_bytes()
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, start: BytesStart, value: &str) -> Result<()> {
    let end = BytesEnd::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(end))?;
    Ok(())
}

/// Set attributes on every `<element>`. Returns the new document and the
/// number of elements touched.
pub fn set_attributes(xml: &str, element: &str, sets: &[(&str, &str)]) -> Result<(String, usize)> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut touched = 0;
    loop {
        match reader.read_event()? {
            Event::Start(e) if is(&e, element) => {
                touched += 1;
                writer.write_event(Event::Start(with_attributes(&e, sets)))?;
            }
            Event::Empty(e) if is(&e, element) => {
                touched += 1;
                writer.write_event(Event::Empty(with_attributes(&e, sets)))?;
            }
            Event::Eof => break,
            e => writer.write_event(e)?,
        }
    }
    Ok((finish(writer)?, touched))
}

/// Attribute `key` of the first `<element>`.
pub fn element_attr(xml: &str, element: &str, key: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if is(&e, element) => return Ok(attr_value(&e, key)),
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

/// Text of `<tag name="name">` in an Android resource file.
pub fn resource_value(xml: &str, tag: &str, name: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(xml);
    let mut capture: Option<String> = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) if is(&e, tag) && attr_value(&e, "name").as_deref() == Some(name) => {
                capture = Some(String::new());
            }
            Event::Empty(e) if is(&e, tag) && attr_value(&e, "name").as_deref() == Some(name) => {
                return Ok(Some(String::new()));
            }
            Event::Text(t) => {
                if let Some(buf) = capture.as_mut() { buf.push_str(&t.unescape()?); }
            }
            Event::End(e) if e.name().as_ref() == tag.as_bytes() => {
                if capture.is_some() { return Ok(capture); }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

/// Set the text of `<tag name="name">` in an Android resource file,
/// appending the entry before `</resources>` when it is missing.
pub fn set_resource_value(xml: &str, tag: &str, name: &str, value: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut skipping = false;
    let mut found = false;
    loop {
        match reader.read_event()? {
            Event::Start(e) if !skipping && is(&e, tag) && attr_value(&e, "name").as_deref() == Some(name) => {
                found = true;
                skipping = true;
                writer.write_event(Event::Start(e))?;
                writer.write_event(Event::Text(BytesText::new(value)))?;
            }
            Event::Empty(e) if !skipping && is(&e, tag) && attr_value(&e, "name").as_deref() == Some(name) => {
                found = true;
                write_text_element(&mut writer, e.into_owned(), value)?;
            }
            Event::End(e) if skipping && e.name().as_ref() == tag.as_bytes() => {
                skipping = false;
                writer.write_event(Event::End(e))?;
            }
            Event::End(e) if !found && e.name().as_ref() == b"resources" => {
                let mut start = BytesStart::new(tag.to_string());
                start.push_attribute(("name", name));
                writer.write_event(Event::Text(BytesText::new("    ")))?;
                write_text_element(&mut writer, start, value)?;
                writer.write_event(Event::Text(BytesText::new("\n")))?;
                writer.write_event(Event::End(e))?;
                found = true;
            }
            Event::Eof => break,
            _ if skipping => {}
            e => writer.write_event(e)?,
        }
    }
    Ok(finish(writer)?)
}

/// Replace the text of `<item name="…">` entries (any of `names`) whose
/// current value satisfies `replace_if`. Returns the document and the count.
pub fn set_style_items<F>(xml: &str, names: &[&str], value: &str, replace_if: F) -> Result<(String, usize)>
where
    F: Fn(&str) -> bool,
{
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut pending: Option<BytesStart<'static>> = None;
    let mut text = String::new();
    let mut count = 0;
    loop {
        let event = reader.read_event()?;
        if let Some(start) = pending.take() {
            match event {
                Event::Text(t) => {
                    text.push_str(&t.unescape()?);
                    pending = Some(start);
                }
                Event::End(end) => {
                    let replaced = replace_if(text.trim());
                    if replaced { count += 1; }
                    let body = if replaced { value } else { text.as_str() };
                    writer.write_event(Event::Start(start))?;
                    writer.write_event(Event::Text(BytesText::new(body)))?;
                    writer.write_event(Event::End(end))?;
                    text.clear();
                }
                other => {
                    // mixed content: pass the item through untouched
                    writer.write_event(Event::Start(start))?;
                    if !text.is_empty() { writer.write_event(Event::Text(BytesText::new(&text)))?; }
                    text.clear();
                    if matches!(other, Event::Eof) { break; }
                    writer.write_event(other)?;
                }
            }
            continue;
        }
        match event {
            Event::Start(e) if is(&e, "item")
                && attr_value(&e, "name").is_some_and(|n| names.contains(&n.as_str())) =>
            {
                pending = Some(e.into_owned());
            }
            Event::Eof => break,
            e => writer.write_event(e)?,
        }
    }
    Ok((finish(writer)?, count))
}

/// Set `<string>` values for top-level keys of a property list, inserting
/// missing keys before the root `</dict>`.
pub fn set_plist_strings(xml: &str, entries: &[(&str, &str)]) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut depth = 0usize;
    let mut key: Option<String> = None;
    let mut in_key = false;
    let mut pending: Option<usize> = None;
    let mut skipping_string = false;
    let mut done = vec![false; entries.len()];

    loop {
        let event = reader.read_event()?;
        if skipping_string {
            if let Event::End(e) = &event {
                if e.name().as_ref() == b"string" {
                    skipping_string = false;
                    writer.write_event(Event::End(e.clone()))?;
                }
            }
            continue;
        }
        match event {
            Event::Start(e) if is(&e, "dict") => {
                depth += 1;
                pending = None;
                writer.write_event(Event::Start(e))?;
            }
            Event::End(e) if e.name().as_ref() == b"dict" => {
                if depth == 1 {
                    for (i, (k, v)) in entries.iter().enumerate() {
                        if done[i] { continue; }
                        writer.write_event(Event::Text(BytesText::new("\t")))?;
                        write_text_element(&mut writer, BytesStart::new("key"), k)?;
                        writer.write_event(Event::Text(BytesText::new("\n\t")))?;
                        write_text_element(&mut writer, BytesStart::new("string"), v)?;
                        writer.write_event(Event::Text(BytesText::new("\n")))?;
                        done[i] = true;
                    }
                }
                depth = depth.saturating_sub(1);
                writer.write_event(Event::End(e))?;
            }
            Event::Start(e) if depth == 1 && is(&e, "key") => {
                in_key = true;
                key = Some(String::new());
                writer.write_event(Event::Start(e))?;
            }
            Event::Text(t) if in_key => {
                if let Some(k) = key.as_mut() { k.push_str(&t.unescape()?); }
                writer.write_event(Event::Text(t))?;
            }
            Event::End(e) if in_key && e.name().as_ref() == b"key" => {
                in_key = false;
                pending = key.take().and_then(|k| entries.iter().position(|(ek, _)| *ek == k.trim()));
                writer.write_event(Event::End(e))?;
            }
            Event::Start(e) if depth == 1 && pending.is_some() => {
                let i = pending.take().unwrap_or_default();
                if is(&e, "string") {
                    done[i] = true;
                    skipping_string = true;
                    writer.write_event(Event::Start(e))?;
                    writer.write_event(Event::Text(BytesText::new(entries[i].1)))?;
                } else {
                    writer.write_event(Event::Start(e))?;
                }
            }
            Event::Empty(e) if depth == 1 && pending.is_some() => {
                let i = pending.take().unwrap_or_default();
                if is(&e, "string") {
                    done[i] = true;
                    write_text_element(&mut writer, e.into_owned(), entries[i].1)?;
                } else {
                    writer.write_event(Event::Empty(e))?;
                }
            }
            Event::Eof => break,
            e => writer.write_event(e)?,
        }
    }
    Ok(finish(writer)?)
}

/// Rewrite every `<color key="backgroundColor" …/>` to a custom sRGB color.
pub fn set_storyboard_background(xml: &str, color: &Color) -> Result<(String, usize)> {
    let (r, g, b) = color.to_unit_rgb();
    let (r, g, b, a) = (storyboard_float(r), storyboard_float(g), storyboard_float(b), storyboard_float(color.unit_alpha()));
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut count = 0;
    loop {
        match reader.read_event()? {
            Event::Empty(e) if is(&e, "color") && attr_value(&e, "key").as_deref() == Some("backgroundColor") => {
                count += 1;
                let mut color_elem = BytesStart::new("color");
                color_elem.extend_attributes([
                    ("key", "backgroundColor"),
                    ("red", r.as_str()),
                    ("green", g.as_str()),
                    ("blue", b.as_str()),
                    ("alpha", a.as_str()),
                    ("colorSpace", "custom"),
                    ("customColorSpace", "sRGB"),
                ]);
                writer.write_event(Event::Empty(color_elem))?;
            }
            Event::Eof => break,
            e => writer.write_event(e)?,
        }
    }
    Ok((finish(writer)?, count))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"<?xml version='1.0' encoding='utf-8'?>
<manifest android:hardwareAccelerated="true" android:versionCode="10000" android:versionName="1.0.0" package="io.cordova.hello" xmlns:android="http://schemas.android.com/apk/res/android">
    <!-- keep me -->
    <application android:label="@string/app_name" />
</manifest>
"#;

    #[test]
    fn sets_manifest_attributes_in_place() {
        let (out, n) = set_attributes(MANIFEST, "manifest", &[
            ("package", "com.example.app"),
            ("android:versionName", "2.1.0"),
            ("android:versionCode", "21"),
        ]).unwrap();
        assert_eq!(n, 1);
        assert!(out.contains(r#"android:versionCode="21" android:versionName="2.1.0" package="com.example.app""#), "{}", out);
        assert!(out.contains("<!-- keep me -->"));
        assert!(out.contains(r#"<application android:label="@string/app_name" />"#) || out.contains(r#"<application android:label="@string/app_name"/>"#));
    }

    #[test]
    fn resource_values_are_set_or_appended() {
        let xml = "<?xml version='1.0' encoding='utf-8'?>\n<resources>\n    <string name=\"app_name\">Hello</string>\n</resources>\n";
        let out = set_resource_value(xml, "string", "app_name", "Acme & Co").unwrap();
        assert_eq!(resource_value(&out, "string", "app_name").unwrap().as_deref(), Some("Acme & Co"));
        assert!(out.contains("Acme &amp; Co"));

        let out = set_resource_value(&out, "color", "cdv_splashscreen_background", "#001833").unwrap();
        assert!(out.contains("    <color name=\"cdv_splashscreen_background\">#001833</color>\n</resources>"), "{}", out);
        assert_eq!(set_resource_value(&out, "color", "cdv_splashscreen_background", "#001833").unwrap(), out);
    }

    #[test]
    fn style_items_only_replace_matching_values() {
        let xml = r#"<resources>
    <style name="Theme.App.SplashScreen" parent="Theme.SplashScreen">
        <item name="windowSplashScreenBackground">#1E1464</item>
        <item name="android:windowBackground">@drawable/screen</item>
        <item name="postSplashScreenTheme">@style/Theme.AppCompat.NoActionBar</item>
    </style>
</resources>"#;
        let names = ["windowSplashScreenBackground", "android:windowBackground"];
        let (out, n) = set_style_items(xml, &names, "#001833", |v| v.starts_with('#')).unwrap();
        assert_eq!(n, 1);
        assert!(out.contains(r#"<item name="windowSplashScreenBackground">#001833</item>"#));
        assert!(out.contains(r#"<item name="android:windowBackground">@drawable/screen</item>"#));
    }

    #[test]
    fn plist_strings_are_replaced_and_inserted() {
        let plist = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>CFBundleDisplayName</key>
	<string>HelloCordova</string>
	<key>NSAppTransportSecurity</key>
	<dict>
		<key>CFBundleDisplayName</key>
		<string>nested</string>
	</dict>
	<key>CFBundleShortVersionString</key>
	<string/>
</dict>
</plist>
"#;
        let out = set_plist_strings(plist, &[
            ("CFBundleDisplayName", "Acme"),
            ("CFBundleShortVersionString", "2.0.0"),
            ("CFBundleVersion", "42"),
        ]).unwrap();
        assert!(out.contains("<key>CFBundleDisplayName</key>\n\t<string>Acme</string>"), "{}", out);
        assert!(out.contains("<string>nested</string>"));
        assert!(out.contains("<key>CFBundleShortVersionString</key>\n\t<string>2.0.0</string>"), "{}", out);
        assert!(out.contains("\t<key>CFBundleVersion</key>\n\t<string>42</string>\n</dict>\n</plist>"), "{}", out);
        assert!(out.contains("<!DOCTYPE plist"));
    }

    #[test]
    fn storyboard_backgrounds_become_custom_srgb() {
        let sb = r#"<view key="view" contentMode="scaleToFill" id="1">
    <color key="backgroundColor" systemColor="systemBackgroundColor"/>
    <color key="tintColor" white="1" alpha="1" colorSpace="custom" customColorSpace="genericGamma22GrayColorSpace"/>
</view>"#;
        let (out, n) = set_storyboard_background(sb, &Color::parse("#FFFFFF").unwrap()).unwrap();
        assert_eq!(n, 1);
        assert!(out.contains(r#"<color key="backgroundColor" red="1" green="1" blue="1" alpha="1" colorSpace="custom" customColorSpace="sRGB"/>"#), "{}", out);
        assert!(out.contains(r#"key="tintColor" white="1""#));
    }
}
