//! Bilingual (English/Arabic) string lookup and layout direction.
//!
//! Strings are addressed by dot-separated keys such as `nav.home`. A key with
//! no entry renders as the key itself so a missing string is visible but
//! never breaks a page.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Name of the cookie holding the visitor's language flag
pub const LANGUAGE_COOKIE: &str = "language";

/// Supported site languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

/// Text direction of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ltr,
    Rtl,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Ar];

    /// Two-letter code used in URLs, cookies and backend queries
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }

    /// Parse a language code; region suffixes (`ar-SA`, `en_US`) are accepted
    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code
            .trim()
            .split(|c| c == '-' || c == '_')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match primary.as_str() {
            "en" => Some(Language::En),
            "ar" => Some(Language::Ar),
            _ => None,
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Language::En => Direction::Ltr,
            Language::Ar => Direction::Rtl,
        }
    }

    /// The language offered by the header switch
    pub fn other(self) -> Self {
        match self {
            Language::En => Language::Ar,
            Language::Ar => Language::En,
        }
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pick the effective language.
///
/// An explicit query parameter wins over the stored flag, which wins over the
/// configured default. Unrecognised values are skipped.
pub fn resolve_language(query: Option<&str>, stored: Option<&str>, default: Language) -> Language {
    query
        .and_then(Language::from_code)
        .or_else(|| stored.and_then(Language::from_code))
        .unwrap_or(default)
}

/// Look up a key, falling back to the key itself
pub fn t(lang: Language, key: &str) -> &str {
    dictionary(lang).and_then(|table| table.get(key).copied()).unwrap_or(key)
}

/// Whole table for a language
pub fn dictionary(lang: Language) -> Option<&'static HashMap<&'static str, &'static str>> {
    DICTIONARIES.get(&lang)
}

lazy_static! {
    static ref DICTIONARIES: HashMap<Language, HashMap<&'static str, &'static str>> = {
        let mut en = HashMap::with_capacity(ENTRIES.len());
        let mut ar = HashMap::with_capacity(ENTRIES.len());
        for (key, en_text, ar_text) in ENTRIES {
            en.insert(*key, *en_text);
            ar.insert(*key, *ar_text);
        }
        let mut tables = HashMap::new();
        tables.insert(Language::En, en);
        tables.insert(Language::Ar, ar);
        tables
    };
}

/// (key, English, Arabic)
const ENTRIES: &[(&str, &str, &str)] = &[
    // Navigation
    ("nav.home", "Home", "الرئيسية"),
    ("nav.about", "About Us", "من نحن"),
    ("nav.products", "Products", "المنتجات"),
    ("nav.contact", "Contact Us", "اتصل بنا"),
    ("nav.switchLanguage", "العربية", "English"),

    // Notification banner
    ("banner.text", "Browse Today's Offers", "تصفح عروض اليوم"),
    ("banner.cta", "Shop Now", "تسوق الآن"),
    ("banner.dismiss", "Dismiss", "إغلاق"),

    // Hero
    ("hero.title", "Powering Tomorrow with Solar Energy", "نمد الغد بالطاقة الشمسية"),
    (
        "hero.subtitle",
        "AFKAR Solar provides cutting-edge solar solutions for a sustainable future. We deliver high-quality solar panels and systems for residential and commercial use.",
        "أفكار سولار تقدم حلول طاقة شمسية متطورة لمستقبل مستدام. نقدم ألواح وأنظمة شمسية عالية الجودة للاستخدام السكني والتجاري.",
    ),
    ("hero.cta", "Explore Products", "استكشف المنتجات"),
    ("hero.secondary", "Contact Us", "اتصل بنا"),

    // Home sections
    ("services.title", "Our Services", "خدماتنا"),
    ("testimonials.title", "What Our Customers Say", "ماذا يقول عملاؤنا"),
    ("projects.title", "Featured Projects", "مشاريع مميزة"),

    // About
    ("about.title", "About AFKAR Solar", "عن أفكار سولار"),
    ("about.subtitle", "Leading the Way in Renewable Energy", "نقود الطريق في الطاقة المتجددة"),
    (
        "about.description",
        "AFKAR Solar is a leading provider of solar energy solutions in Saudi Arabia. We are committed to delivering innovative and sustainable energy solutions that help reduce carbon footprint and energy costs.",
        "أفكار سولار هي شركة رائدة في تقديم حلول الطاقة الشمسية في المملكة العربية السعودية. نحن ملتزمون بتقديم حلول طاقة مبتكرة ومستدامة تساعد في تقليل البصمة الكربونية وتكاليف الطاقة.",
    ),
    ("about.mission.title", "Our Mission", "مهمتنا"),
    (
        "about.mission.text",
        "To accelerate the transition to sustainable energy by providing high-quality, affordable solar solutions.",
        "تسريع التحول إلى الطاقة المستدامة من خلال توفير حلول شمسية عالية الجودة وبأسعار معقولة.",
    ),
    ("about.vision.title", "Our Vision", "رؤيتنا"),
    (
        "about.vision.text",
        "To be the leading solar energy provider in the Middle East, powering a cleaner and greener future.",
        "أن نكون المزود الرائد للطاقة الشمسية في الشرق الأوسط، ونمد مستقبلاً أنظف وأخضر.",
    ),
    ("about.values.title", "Our Values", "قيمنا"),
    (
        "about.values.text",
        "Innovation, Sustainability, Quality, and Customer Satisfaction are at the core of everything we do.",
        "الابتكار والاستدامة والجودة ورضا العملاء هي جوهر كل ما نقوم به.",
    ),

    // Products
    ("products.title", "Our Products", "منتجاتنا"),
    ("products.subtitle", "High-Quality Solar Solutions", "حلول شمسية عالية الجودة"),
    ("products.viewAll", "View All Products", "عرض جميع المنتجات"),
    ("products.viewDetails", "View Details", "عرض التفاصيل"),
    ("products.price", "Price", "السعر"),
    ("products.sar", "SAR", "ريال"),
    ("products.all", "All", "الكل"),
    ("products.empty", "No products found", "لا توجد منتجات"),
    ("products.back", "Back to Products", "العودة إلى المنتجات"),

    // Contact
    ("contact.title", "Contact Us", "اتصل بنا"),
    ("contact.subtitle", "Get in Touch", "تواصل معنا"),
    ("contact.name", "Your Name", "اسمك"),
    ("contact.email", "Email Address", "البريد الإلكتروني"),
    ("contact.phone", "Phone Number", "رقم الهاتف"),
    ("contact.message", "Your Message", "رسالتك"),
    ("contact.send", "Send Message", "إرسال الرسالة"),
    ("contact.sales", "Sales", "المبيعات"),
    ("contact.support", "Technical Support", "الدعم الفني"),

    // Footer
    ("footer.rights", "All Rights Reserved", "جميع الحقوق محفوظة"),
    ("footer.followUs", "Follow Us", "تابعنا"),
    ("footer.quickLinks", "Quick Links", "روابط سريعة"),
    ("footer.contactInfo", "Contact Information", "معلومات الاتصال"),

    // Errors
    ("notFound.title", "Page Not Found", "الصفحة غير موجودة"),
    ("notFound.back", "Back to Home", "العودة للرئيسية"),

    // Dashboard
    ("dashboard.title", "Dashboard", "لوحة التحكم"),
    ("dashboard.welcome", "Welcome to the AFKAR Solar dashboard", "مرحباً بك في لوحة تحكم أفكار سولار"),
    ("dashboard.viewAll", "View all", "عرض الكل"),
    ("dashboard.sections", "Sections", "الأقسام"),
    ("dashboard.products", "Products", "المنتجات"),
    ("dashboard.logout", "Logout", "تسجيل الخروج"),
    ("dashboard.add", "Add New", "إضافة جديد"),
    ("dashboard.edit", "Edit", "تعديل"),
    ("dashboard.delete", "Delete", "حذف"),
    ("dashboard.save", "Save", "حفظ"),
    ("dashboard.cancel", "Cancel", "إلغاء"),
    ("dashboard.actions", "Actions", "الإجراءات"),
    ("dashboard.name", "Name", "الاسم"),
    ("dashboard.nameAr", "Name (Arabic)", "الاسم (عربي)"),
    ("dashboard.nameEn", "Name (English)", "الاسم (إنجليزي)"),
    ("dashboard.description", "Description", "الوصف"),
    ("dashboard.descriptionAr", "Description (Arabic)", "الوصف (عربي)"),
    ("dashboard.descriptionEn", "Description (English)", "الوصف (إنجليزي)"),
    ("dashboard.price", "Price", "السعر"),
    ("dashboard.section", "Section", "القسم"),
    ("dashboard.images", "Images", "الصور"),
    ("dashboard.existingImages", "Current Images", "الصور الحالية"),
    ("dashboard.newImages", "Add Images", "إضافة صور"),
    ("dashboard.image", "Image", "الصورة"),
    ("dashboard.mainDesc", "Main Description", "الوصف الرئيسي"),
    ("dashboard.subDesc", "Sub Description", "الوصف الفرعي"),
    ("dashboard.mainDescAr", "Main Description (Arabic)", "الوصف الرئيسي (عربي)"),
    ("dashboard.mainDescEn", "Main Description (English)", "الوصف الرئيسي (إنجليزي)"),
    ("dashboard.subDescAr", "Sub Description (Arabic)", "الوصف الفرعي (عربي)"),
    ("dashboard.subDescEn", "Sub Description (English)", "الوصف الفرعي (إنجليزي)"),
    ("dashboard.noData", "No data available", "لا توجد بيانات"),
    ("dashboard.confirmDelete", "Are you sure you want to delete this item?", "هل أنت متأكد من حذف هذا العنصر؟"),
    ("dashboard.manageSections", "Manage product sections", "إدارة أقسام المنتجات"),
    ("dashboard.manageProducts", "Manage your products catalog", "إدارة كتالوج المنتجات"),
    ("dashboard.manageProjects", "Manage your featured project cards", "إدارة بطاقات المشاريع المميزة"),
    ("dashboard.manageCustomers", "Manage customers and their information", "إدارة العملاء ومعلوماتهم"),
    ("dashboard.manageFeedback", "Manage customer feedback and testimonials", "إدارة تقييمات وشهادات العملاء"),
    ("dashboard.manageAdmins", "Manage administrator accounts", "إدارة حسابات المسؤولين"),
    ("dashboard.saved", "Saved successfully", "تم الحفظ بنجاح"),
    ("dashboard.deleted", "Deleted successfully", "تم الحذف بنجاح"),
    ("dashboard.saveFailed", "Failed to save", "فشل الحفظ"),
    ("dashboard.deleteFailed", "Failed to delete", "فشل الحذف"),
    ("dashboard.loadFailed", "Failed to load details", "فشل تحميل التفاصيل"),
    ("dashboard.customerRequired", "Please select a customer", "الرجاء اختيار عميل"),

    // Admin management
    ("dashboard.admins", "Admins", "المسؤولين"),
    ("dashboard.username", "Username", "اسم المستخدم"),
    ("dashboard.role", "Role", "الدور"),
    ("dashboard.registerAdmin", "Register Admin", "تسجيل مسؤول"),
    ("dashboard.updateRole", "Update Role", "تحديث الدور"),
    ("dashboard.password", "Password", "كلمة المرور"),

    // Projects, customers and feedback
    ("dashboard.projects", "Projects", "المشاريع"),
    ("dashboard.titleAr", "Title (Arabic)", "العنوان (عربي)"),
    ("dashboard.titleEn", "Title (English)", "العنوان (إنجليزي)"),
    ("dashboard.locationAr", "Location (Arabic)", "الموقع (عربي)"),
    ("dashboard.locationEn", "Location (English)", "الموقع (إنجليزي)"),
    ("dashboard.location", "Location", "الموقع"),
    ("dashboard.customers", "Customers", "العملاء"),
    ("dashboard.customerNameEn", "Customer Name (English)", "اسم العميل (إنجليزي)"),
    ("dashboard.customerNameAr", "Customer Name (Arabic)", "اسم العميل (عربي)"),
    ("dashboard.customerJobEn", "Job Title (English)", "المسمى الوظيفي (إنجليزي)"),
    ("dashboard.customerJobAr", "Job Title (Arabic)", "المسمى الوظيفي (عربي)"),
    ("dashboard.customerFeedback", "Customer Feedback", "آراء العملاء"),
    ("dashboard.customer", "Customer", "العميل"),
    ("dashboard.selectCustomer", "Select a customer", "اختر عميلاً"),
    ("dashboard.feedbackEn", "Feedback (English)", "التقييم (إنجليزي)"),
    ("dashboard.feedbackAr", "Feedback (Arabic)", "التقييم (عربي)"),

    // Login
    ("login.title", "Admin Login", "تسجيل دخول المسؤول"),
    ("login.subtitle", "Enter your credentials to access the dashboard", "أدخل بيانات الاعتماد للوصول إلى لوحة التحكم"),
    ("login.username", "Username", "اسم المستخدم"),
    ("login.password", "Password", "كلمة المرور"),
    ("login.submit", "Login", "تسجيل الدخول"),
    ("login.error", "Invalid username or password", "اسم المستخدم أو كلمة المرور غير صحيحة"),
];
