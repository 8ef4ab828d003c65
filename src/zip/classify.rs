//! Fingerprinting of ZIP-based document formats.
//!
//! Many formats are plain ZIP archives with a well-known member inside, or
//! with a stored `mimetype` member (ODF, EPUB). [`classify`] checks the
//! collected member names and sniffed MIME string against an ordered rule
//! table; the first matching rule wins.

/// A ZIP-family container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Docx,
    Pptx,
    Xlsx,
    Xps,
    Apk,
    Snb,
    Cdr,
    Dpp,
    Ppp,
    Kmz,
    Odt,
    Ods,
    Odp,
    Odg,
    Epub,
    Zip,
}

impl ContainerKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ContainerKind::Docx => "DOCX",
            ContainerKind::Pptx => "PPTX",
            ContainerKind::Xlsx => "XLSX",
            ContainerKind::Xps => "XPS",
            ContainerKind::Apk => "APK",
            ContainerKind::Snb => "SNB",
            ContainerKind::Cdr => "CDR",
            ContainerKind::Dpp => "DPP",
            ContainerKind::Ppp => "PPP",
            ContainerKind::Kmz => "KMZ",
            ContainerKind::Odt => "ODT",
            ContainerKind::Ods => "ODS",
            ContainerKind::Odp => "ODP",
            ContainerKind::Odg => "ODG",
            ContainerKind::Epub => "EPUB",
            ContainerKind::Zip => "ZIP",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ContainerKind::Docx => "Microsoft Word (2010 and above) document",
            ContainerKind::Pptx => "Microsoft PowerPoint (2010 and above) presentation",
            ContainerKind::Xlsx => "Microsoft Excel (2010 and above) spreadsheet",
            ContainerKind::Xps => "Microsoft XPS document",
            ContainerKind::Apk => "Android application package",
            ContainerKind::Snb => "Exported Samsung S-Note file",
            ContainerKind::Cdr => "CorelDraw image",
            ContainerKind::Dpp => "Serif DrawPlus document",
            ContainerKind::Ppp => "Serif PagePlus document",
            ContainerKind::Kmz => "Google Earth location data",
            ContainerKind::Odt => "OpenDocument text file",
            ContainerKind::Ods => "OpenDocument spreadsheet",
            ContainerKind::Odp => "OpenDocument presentation",
            ContainerKind::Odg => "OpenDocument graphics file",
            ContainerKind::Epub => "Electronic publication or e-book",
            ContainerKind::Zip => "Standard ZIP file",
        }
    }
}

/// One classification rule.
#[derive(Debug, Clone, Copy)]
enum Fingerprint {
    /// Every listed member is present.
    Members(&'static [&'static str], ContainerKind),
    /// The sniffed MIME string contains the substring.
    MimeContains(&'static str, ContainerKind),
    /// `Root.xml` and `summary.xml` mark a Serif project; the preview image
    /// picks the product. Once matched, no later rule is consulted.
    Serif,
}

fn has(members: &[String], name: &str) -> bool {
    members.iter().any(|m| m == name)
}

impl Fingerprint {
    fn apply(&self, members: &[String], mime_type: Option<&str>) -> Option<ContainerKind> {
        match *self {
            Fingerprint::Members(required, kind) => required
                .iter()
                .all(|name| has(members, name))
                .then_some(kind),
            Fingerprint::MimeContains(needle, kind) => mime_type
                .is_some_and(|m| m.contains(needle))
                .then_some(kind),
            Fingerprint::Serif => {
                if !(has(members, "Root.xml") && has(members, "summary.xml")) {
                    None
                } else if has(members, "preview.png") {
                    Some(ContainerKind::Dpp)
                } else if has(members, "preview.jpg") {
                    Some(ContainerKind::Ppp)
                } else {
                    Some(ContainerKind::Zip)
                }
            }
        }
    }
}

const FINGERPRINTS: &[Fingerprint] = &[
    Fingerprint::Members(&["word/document.xml"], ContainerKind::Docx),
    Fingerprint::Members(&["ppt/presentation.xml"], ContainerKind::Pptx),
    Fingerprint::Members(&["xl/workbook.xml"], ContainerKind::Xlsx),
    Fingerprint::Members(&["FixedDocSeq.fdseq"], ContainerKind::Xps),
    Fingerprint::Members(&["AndroidManifest.xml"], ContainerKind::Apk),
    Fingerprint::Members(&["snote/snote.xml"], ContainerKind::Snb),
    Fingerprint::Members(&["content/riffData.cdr"], ContainerKind::Cdr),
    Fingerprint::Serif,
    Fingerprint::Members(&["doc.kml"], ContainerKind::Kmz),
    Fingerprint::MimeContains("opendocument.text", ContainerKind::Odt),
    Fingerprint::MimeContains("opendocument.spreadsheet", ContainerKind::Ods),
    Fingerprint::MimeContains("opendocument.presentation", ContainerKind::Odp),
    Fingerprint::MimeContains("opendocument.graphics", ContainerKind::Odg),
    Fingerprint::MimeContains("application/epub", ContainerKind::Epub),
];

/// Pick the container format from member names and the sniffed MIME string.
pub fn classify(members: &[String], mime_type: Option<&str>) -> ContainerKind {
    FINGERPRINTS
        .iter()
        .find_map(|fingerprint| fingerprint.apply(members, mime_type))
        .unwrap_or(ContainerKind::Zip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[rstest]
    #[case(&["[Content_Types].xml", "word/document.xml"], None, ContainerKind::Docx)]
    #[case(&["ppt/presentation.xml"], None, ContainerKind::Pptx)]
    #[case(&["xl/workbook.xml", "xl/styles.xml"], None, ContainerKind::Xlsx)]
    #[case(&["FixedDocSeq.fdseq"], None, ContainerKind::Xps)]
    #[case(&["AndroidManifest.xml", "classes.dex"], None, ContainerKind::Apk)]
    #[case(&["snote/snote.xml"], None, ContainerKind::Snb)]
    #[case(&["content/riffData.cdr"], None, ContainerKind::Cdr)]
    #[case(&["Root.xml", "summary.xml", "preview.png"], None, ContainerKind::Dpp)]
    #[case(&["preview.jpg", "summary.xml", "Root.xml"], None, ContainerKind::Ppp)]
    #[case(&["doc.kml"], None, ContainerKind::Kmz)]
    #[case(&["mimetype"], Some("application/vnd.oasis.opendocument.text"), ContainerKind::Odt)]
    #[case(&["mimetype"], Some("application/vnd.oasis.opendocument.spreadsheet"), ContainerKind::Ods)]
    #[case(&["mimetype"], Some("application/vnd.oasis.opendocument.presentation"), ContainerKind::Odp)]
    #[case(&["mimetype"], Some("application/vnd.oasis.opendocument.graphics"), ContainerKind::Odg)]
    #[case(&["mimetype"], Some("application/epub+zip"), ContainerKind::Epub)]
    #[case(&[], None, ContainerKind::Zip)]
    #[case(&["readme.txt"], Some("text/plain"), ContainerKind::Zip)]
    fn fingerprints(
        #[case] members: &[&str],
        #[case] mime_type: Option<&str>,
        #[case] expected: ContainerKind,
    ) {
        assert_eq!(classify(&names(members), mime_type), expected);
    }

    #[test]
    fn first_matching_rule_wins() {
        let members = names(&["xl/workbook.xml", "word/document.xml"]);
        let kind = classify(&members, Some("application/epub+zip"));
        assert_eq!(kind, ContainerKind::Docx);
        assert_eq!(kind.extension(), "DOCX");
        assert_eq!(kind.description(), "Microsoft Word (2010 and above) document");
    }

    #[rstest]
    #[case(&["Root.xml", "summary.xml", "doc.kml"], None)]
    #[case(&["mimetype", "Root.xml", "summary.xml"], Some("application/vnd.oasis.opendocument.text"))]
    #[case(&["Root.xml", "summary.xml"], Some("application/epub+zip"))]
    fn serif_project_without_preview_is_plain_zip(
        #[case] members: &[&str],
        #[case] mime_type: Option<&str>,
    ) {
        assert_eq!(classify(&names(members), mime_type), ContainerKind::Zip);
    }

    #[test]
    fn serif_gate_needs_both_markers() {
        let members = names(&["Root.xml", "doc.kml"]);
        assert_eq!(classify(&members, None), ContainerKind::Kmz);
    }
}
