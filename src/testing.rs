//! Helpers for writing small synthetic DICOM files in tests.
use dicom::core::{DataElement, PrimitiveValue, VR};
use dicom::dictionary_std::{tags, uids};
use dicom::encoding::TransferSyntax;
use dicom::object::{FileMetaTableBuilder, InMemDicomObject};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

pub struct SyntheticDicom {
    sop_instance_uid: String,
    rows: u16,
    columns: u16,
    pixels: Vec<u16>,
    photometric: &'static str,
    window: Option<(Vec<String>, Vec<String>)>,
    rescale: Option<(String, String)>,
}

impl SyntheticDicom {
    /// A 16-bit MONOCHROME2 ramp image with window [0, 256] and identity rescale.
    pub fn new(sop_instance_uid: &str, rows: u16, columns: u16) -> Self {
        let numel = rows as usize * columns as usize;
        Self {
            sop_instance_uid: sop_instance_uid.to_string(),
            rows,
            columns,
            pixels: (0..numel).map(|i| i as u16).collect(),
            photometric: "MONOCHROME2",
            window: Some((vec!["128".to_string()], vec!["256".to_string()])),
            rescale: Some(("0".to_string(), "1".to_string())),
        }
    }

    pub fn with_pixels(mut self, pixels: Vec<u16>) -> Self {
        assert_eq!(pixels.len(), self.rows as usize * self.columns as usize);
        self.pixels = pixels;
        self
    }

    pub fn with_constant(self, value: u16) -> Self {
        let numel = self.rows as usize * self.columns as usize;
        self.with_pixels(vec![value; numel])
    }

    pub fn with_photometric(mut self, photometric: &'static str) -> Self {
        self.photometric = photometric;
        self
    }

    pub fn with_window(mut self, center: &[&str], width: &[&str]) -> Self {
        let to_owned = |v: &[&str]| v.iter().map(|s| s.to_string()).collect();
        self.window = Some((to_owned(center), to_owned(width)));
        self
    }

    pub fn without_window(mut self) -> Self {
        self.window = None;
        self
    }

    pub fn without_rescale(mut self) -> Self {
        self.rescale = None;
        self
    }

    fn build(&self) -> InMemDicomObject {
        let mut obj = InMemDicomObject::new_empty();
        obj.put(DataElement::new(
            tags::SOP_CLASS_UID,
            VR::UI,
            PrimitiveValue::from(uids::CT_IMAGE_STORAGE),
        ));
        obj.put(DataElement::new(
            tags::SOP_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from(self.sop_instance_uid.as_str()),
        ));
        obj.put(DataElement::new(
            tags::SAMPLES_PER_PIXEL,
            VR::US,
            PrimitiveValue::from(1_u16),
        ));
        obj.put(DataElement::new(
            tags::PHOTOMETRIC_INTERPRETATION,
            VR::CS,
            PrimitiveValue::from(self.photometric),
        ));
        obj.put(DataElement::new(tags::ROWS, VR::US, PrimitiveValue::from(self.rows)));
        obj.put(DataElement::new(
            tags::COLUMNS,
            VR::US,
            PrimitiveValue::from(self.columns),
        ));
        obj.put(DataElement::new(
            tags::BITS_ALLOCATED,
            VR::US,
            PrimitiveValue::from(16_u16),
        ));
        obj.put(DataElement::new(
            tags::BITS_STORED,
            VR::US,
            PrimitiveValue::from(16_u16),
        ));
        obj.put(DataElement::new(tags::HIGH_BIT, VR::US, PrimitiveValue::from(15_u16)));
        obj.put(DataElement::new(
            tags::PIXEL_REPRESENTATION,
            VR::US,
            PrimitiveValue::from(0_u16),
        ));
        if let Some((center, width)) = &self.window {
            obj.put(DataElement::new(
                tags::WINDOW_CENTER,
                VR::DS,
                PrimitiveValue::Strs(center.clone().into()),
            ));
            obj.put(DataElement::new(
                tags::WINDOW_WIDTH,
                VR::DS,
                PrimitiveValue::Strs(width.clone().into()),
            ));
        }
        if let Some((intercept, slope)) = &self.rescale {
            obj.put(DataElement::new(
                tags::RESCALE_INTERCEPT,
                VR::DS,
                PrimitiveValue::from(intercept.as_str()),
            ));
            obj.put(DataElement::new(
                tags::RESCALE_SLOPE,
                VR::DS,
                PrimitiveValue::from(slope.as_str()),
            ));
        }
        obj.put(DataElement::new(
            tags::PIXEL_DATA,
            VR::OW,
            PrimitiveValue::U16(self.pixels.clone().into()),
        ));
        obj
    }

    /// Write a complete DICOM file with preamble and file meta group.
    pub fn write<P: AsRef<Path>>(&self, path: P) {
        let file = self
            .build()
            .with_meta(
                FileMetaTableBuilder::new()
                    .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
                    .media_storage_sop_class_uid(uids::CT_IMAGE_STORAGE)
                    .media_storage_sop_instance_uid(self.sop_instance_uid.as_str()),
            )
            .unwrap();
        file.write_to_file(path).unwrap();
    }

    /// Write only the data set, without preamble or file meta group.
    pub fn write_dataset<P: AsRef<Path>>(&self, path: P, ts: &TransferSyntax) {
        let file = BufWriter::new(File::create(path).unwrap());
        self.build().write_dataset_with_ts(file, ts).unwrap();
    }
}
