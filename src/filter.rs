use dicom_core::header::Header;
use dicom_core::value::Value;
use dicom_core::Tag;
use dicom_object::InMemDicomObject;

/// Removes every attribute listed in `removal_set` from `obj`, at any nesting depth.
///
/// Top-level attributes are deleted first, then every sequence-valued attribute is visited
/// depth-first and each of its items is filtered the same way. Sequences are recognized by
/// their value being [`Value::Sequence`], not by their VR. Missing attributes are ignored and
/// applying the filter more than once has no further effect.
///
/// # Example
///
/// ```
/// use anonymri::filter::remove_identifying_attributes;
/// use anonymri::removal::REMOVAL_SET;
/// use anonymri::tags;
/// use dicom_core::{DataElement, PrimitiveValue, VR};
/// use dicom_object::InMemDicomObject;
///
/// let mut obj = InMemDicomObject::from_element_iter([
///     DataElement::new(tags::PATIENT_NAME, VR::PN, PrimitiveValue::from("Doe^John")),
///     DataElement::new(tags::MODALITY, VR::CS, PrimitiveValue::from("MR")),
/// ]);
/// remove_identifying_attributes(&mut obj, &REMOVAL_SET);
///
/// assert!(obj.element_opt(tags::PATIENT_NAME).unwrap().is_none());
/// assert!(obj.element_opt(tags::MODALITY).unwrap().is_some());
/// ```
pub fn remove_identifying_attributes(obj: &mut InMemDicomObject, removal_set: &[Tag]) {
    for tag in removal_set {
        obj.remove_element(*tag);
    }

    let sequence_tags: Vec<Tag> = obj
        .iter()
        .filter(|elem| matches!(elem.value(), Value::Sequence(_)))
        .map(|elem| elem.tag())
        .collect();

    for tag in sequence_tags {
        obj.update_value(tag, |value| {
            if let Value::Sequence(sequence) = value {
                for item in sequence.items_mut().iter_mut() {
                    remove_identifying_attributes(item, removal_set);
                }
            }
        });
    }
}
