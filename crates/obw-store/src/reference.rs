//! Reference master data: the eight standard outpatient categories and a
//! small service catalogue under each. Used to seed demo deployments and
//! tests; production master data is administered elsewhere.

use obw_core::{CategoryId, ServiceCode, ValidationError};

use crate::records::{Category, Service};

const CATEGORIES: [(&str, &str, &str); 8] = [
    ("CAT001", "CLINIC_CONSULT", "Clinic Consultation"),
    ("CAT002", "PHARMACY", "Pharmacy"),
    ("CAT003", "DIAGNOSTIC", "Diagnostic Services"),
    ("CAT004", "LABORATORY", "Laboratory Services"),
    ("CAT005", "ONLINE_CONSULT", "Online Consultation"),
    ("CAT006", "DENTAL", "Dental Services"),
    ("CAT007", "VISION", "Vision Care"),
    ("CAT008", "WELLNESS", "Wellness & Preventive Care"),
];

const SERVICES: [(&str, &str, &str); 17] = [
    ("CON001", "General Medicine", "CAT001"),
    ("CON002", "Pediatrics", "CAT001"),
    ("CON003", "Gynecology", "CAT001"),
    ("PHA001", "Retail Pharmacy", "CAT002"),
    ("PHA002", "E-Pharmacy", "CAT002"),
    ("DIA001", "X-Ray", "CAT003"),
    ("DIA002", "Ultrasound", "CAT003"),
    ("LAB001", "CBC", "CAT004"),
    ("LAB002", "Lipid Profile", "CAT004"),
    ("LAB003", "Thyroid Panel", "CAT004"),
    ("TEL001", "Video Consultation", "CAT005"),
    ("DEN001", "Dental Cleaning", "CAT006"),
    ("DEN002", "Tooth Filling", "CAT006"),
    ("VIS001", "Eye Examination", "CAT007"),
    ("VIS002", "Spectacles", "CAT007"),
    ("WEL001", "Annual Health Check", "CAT008"),
    ("WEL002", "Flu Vaccination", "CAT008"),
];

/// The reference categories, all active, in display order.
pub fn reference_categories() -> Result<Vec<Category>, ValidationError> {
    CATEGORIES
        .iter()
        .zip(1u32..)
        .map(|((id, code, name), order)| {
            Ok(Category {
                category_id: CategoryId::new(*id)?,
                code: (*code).to_string(),
                name: (*name).to_string(),
                is_active: true,
                display_order: order,
            })
        })
        .collect()
}

/// The reference services, all active.
pub fn reference_services() -> Result<Vec<Service>, ValidationError> {
    SERVICES
        .iter()
        .zip(1u32..)
        .map(|((code, name, category), order)| {
            Ok(Service {
                service_code: ServiceCode::new(*code)?,
                service_name: (*name).to_string(),
                category_id: CategoryId::new(*category)?,
                is_active: true,
                display_order: order,
            })
        })
        .collect()
}
