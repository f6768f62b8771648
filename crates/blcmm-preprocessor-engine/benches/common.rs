// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_blcmm_content(categories: usize, codes_per_category: usize) -> String {
    let mut content = String::from(
        "<BLCMM v=\"1\">\n\t<head>\n\t\t<type name=\"BL2\" offline=\"false\"/>\n\t</head>\n\t<body>\n",
    );

    for category in 0..categories {
        content.push_str(&format!(
            "\t\t<category name=\"Tweaks & Fixes #{category}\">\n"
        ));
        for code in 0..codes_per_category {
            content.push_str(&format!(
                "\t\t\t<code profiles=\"default\">set GD_Weap_{code}.Part Name \"Bob's <{code}> & co\"</code>\n"
            ));
        }
        content.push_str("\t\t</category>\n");
    }

    content.push_str("\t</body>\n</BLCMM>\n");
    content
}

#[allow(dead_code)]
pub fn generate_attribute_heavy_line(attributes: usize) -> String {
    let mut line = String::from("<hotfix");
    for i in 0..attributes {
        line.push_str(&format!(" a{i}=\"x \\\"{i}\\\" & y\""));
    }
    line.push_str(">value</hotfix>\n</BLCMM>\n");
    line
}
