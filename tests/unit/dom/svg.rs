use super::*;

#[test]
fn svg_root_gets_namespace_and_escaped_attributes() {
    let mut doc = Document::new();
    let svg = doc.create_element("svg");
    doc.set_attr(svg, "viewBox", "0 0 10 10").unwrap();
    let t = doc.append_new(svg, "text", &[("data-note", "a<b & \"c\"")]).unwrap();
    doc.set_text(t, "x > y").unwrap();

    let markup = to_markup(&doc, svg);
    assert_eq!(
        markup,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 10 10\">\
         <text data-note=\"a&lt;b &amp; &quot;c&quot;\">x &gt; y</text></svg>"
    );
}

#[test]
fn empty_elements_self_close() {
    let mut doc = Document::new();
    let g = doc.create_element("g");
    doc.append_new(g, "rect", &[("x", "1")]).unwrap();
    assert_eq!(to_markup(&doc, g), "<g><rect x=\"1\"/></g>");
}

#[test]
fn explicit_namespace_is_not_duplicated() {
    let mut doc = Document::new();
    let svg = doc.create_element("svg");
    doc.set_attr(svg, "xmlns", SVG_NS).unwrap();
    assert_eq!(to_markup(&doc, svg).matches("xmlns").count(), 1);
}
