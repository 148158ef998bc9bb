//! # Message Catalogue
//!
//! Every user-facing notification text, in Indonesian (default), English
//! and Chinese. Lookups are total: each key has a text in each language.

use idcashier_core::receipt::ReceiptLabels;
use idcashier_core::report::ReportLabels;
use serde::{Deserialize, Serialize};
use std::fmt;

/// UI language, persisted under `idcashier_language`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Id,
    En,
    Zh,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Id => "id",
            Language::En => "en",
            Language::Zh => "zh",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "id" | "id-id" => Some(Language::Id),
            "en" | "en-us" | "en-gb" => Some(Language::En),
            "zh" | "zh-cn" => Some(Language::Zh),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    // Titles
    Error,
    Success,
    Warning,

    // Authentication
    LoginSuccess,
    LoginFailed,
    LoggedOut,
    SessionExpired,
    AuthenticationRequired,
    PermissionDenied,
    PasswordResetSent,
    PasswordUpdated,
    Registered,

    // Checkout
    CartEmpty,
    InsufficientPayment,
    MaxDiscount,
    TaxNegative,
    TotalMustBePositive,
    InvalidQuantity,
    InvalidCustomerSelection,
    InsufficientStock,
    TransactionSaved,
    TransactionFailed,
    DiscountClamped,
    DiscountNegativeClamped,
    TaxClamped,
    NamePhoneRequired,
    CustomerAdded,

    // Reports
    ReportLoadFailed,
    TransactionsDeleted,
    TransactionsDeletePartial,

    // Catalog and users
    Saved,
    Deleted,
    Imported,
    UserAdded,
    SubscriptionCreateFailed,
    SubscriptionExtended,

    // Generic
    ServerNotResponding,
    NotFound,
    DataInconsistency,
    SettingsSaved,
    Unexpected,
}

/// Looks up a message.
pub fn translate(language: Language, key: MessageKey) -> &'static str {
    use Language::*;
    use MessageKey::*;

    match (key, language) {
        (Error, Id) => "Kesalahan",
        (Error, En) => "Error",
        (Error, Zh) => "错误",
        (Success, Id) => "Berhasil",
        (Success, En) => "Success",
        (Success, Zh) => "成功",
        (Warning, Id) => "Peringatan",
        (Warning, En) => "Warning",
        (Warning, Zh) => "警告",

        (LoginSuccess, Id) => "Login berhasil",
        (LoginSuccess, En) => "Logged in successfully",
        (LoginSuccess, Zh) => "登录成功",
        (LoginFailed, Id) => "Email atau password salah",
        (LoginFailed, En) => "Invalid email or password",
        (LoginFailed, Zh) => "邮箱或密码错误",
        (LoggedOut, Id) => "Anda telah keluar",
        (LoggedOut, En) => "You have been logged out",
        (LoggedOut, Zh) => "您已退出登录",
        (SessionExpired, Id) => "Sesi telah berakhir, silakan login kembali",
        (SessionExpired, En) => "Your session has expired, please log in again",
        (SessionExpired, Zh) => "会话已过期，请重新登录",
        (AuthenticationRequired, Id) => "Silakan login terlebih dahulu",
        (AuthenticationRequired, En) => "Authentication required",
        (AuthenticationRequired, Zh) => "请先登录",
        (PermissionDenied, Id) => "Anda tidak memiliki izin",
        (PermissionDenied, En) => "You do not have permission",
        (PermissionDenied, Zh) => "您没有权限",
        (PasswordResetSent, Id) => "Tautan reset password telah dikirim",
        (PasswordResetSent, En) => "Password reset link sent",
        (PasswordResetSent, Zh) => "重置密码链接已发送",
        (PasswordUpdated, Id) => "Password berhasil diperbarui",
        (PasswordUpdated, En) => "Password updated",
        (PasswordUpdated, Zh) => "密码已更新",
        (Registered, Id) => "Pendaftaran berhasil",
        (Registered, En) => "Registration successful",
        (Registered, Zh) => "注册成功",

        (CartEmpty, Id) => "Keranjang masih kosong",
        (CartEmpty, En) => "Cart is empty",
        (CartEmpty, Zh) => "购物车为空",
        (InsufficientPayment, Id) => "Jumlah pembayaran kurang",
        (InsufficientPayment, En) => "Insufficient payment",
        (InsufficientPayment, Zh) => "付款金额不足",
        (MaxDiscount, Id) => "Diskon maksimal 100%",
        (MaxDiscount, En) => "Discount cannot exceed 100%",
        (MaxDiscount, Zh) => "折扣不能超过100%",
        (TaxNegative, Id) => "Pajak tidak boleh negatif",
        (TaxNegative, En) => "Tax cannot be negative",
        (TaxNegative, Zh) => "税率不能为负",
        (TotalMustBePositive, Id) => "Total harus lebih dari nol",
        (TotalMustBePositive, En) => "Total must be greater than zero",
        (TotalMustBePositive, Zh) => "总额必须大于零",
        (InvalidQuantity, Id) => "Jumlah item tidak valid",
        (InvalidQuantity, En) => "Invalid item quantity",
        (InvalidQuantity, Zh) => "商品数量无效",
        (InvalidCustomerSelection, Id) => "Pelanggan yang dipilih tidak valid",
        (InvalidCustomerSelection, En) => "Invalid customer selection",
        (InvalidCustomerSelection, Zh) => "所选客户无效",
        (InsufficientStock, Id) => "Stok tidak mencukupi",
        (InsufficientStock, En) => "Insufficient stock",
        (InsufficientStock, Zh) => "库存不足",
        (TransactionSaved, Id) => "Transaksi berhasil disimpan",
        (TransactionSaved, En) => "Transaction saved",
        (TransactionSaved, Zh) => "交易已保存",
        (TransactionFailed, Id) => "Transaksi gagal",
        (TransactionFailed, En) => "Transaction failed",
        (TransactionFailed, Zh) => "交易失败",
        (DiscountClamped, Id) => "Diskon diubah menjadi 100%",
        (DiscountClamped, En) => "Discount lowered to 100%",
        (DiscountClamped, Zh) => "折扣已调整为100%",
        (DiscountNegativeClamped, Id) => "Diskon negatif diubah menjadi 0%",
        (DiscountNegativeClamped, En) => "Negative discount raised to 0%",
        (DiscountNegativeClamped, Zh) => "负折扣已调整为0%",
        (TaxClamped, Id) => "Pajak negatif diubah menjadi 0%",
        (TaxClamped, En) => "Negative tax raised to 0%",
        (TaxClamped, Zh) => "负税率已调整为0%",
        (NamePhoneRequired, Id) => "Nama dan telepon wajib diisi",
        (NamePhoneRequired, En) => "Name and phone are required",
        (NamePhoneRequired, Zh) => "姓名和电话为必填项",
        (CustomerAdded, Id) => "Pelanggan ditambahkan",
        (CustomerAdded, En) => "Customer added",
        (CustomerAdded, Zh) => "客户已添加",

        (ReportLoadFailed, Id) => "Gagal memuat data laporan",
        (ReportLoadFailed, En) => "Failed to load report data",
        (ReportLoadFailed, Zh) => "加载报表数据失败",
        (TransactionsDeleted, Id) => "Transaksi dihapus",
        (TransactionsDeleted, En) => "Transactions deleted",
        (TransactionsDeleted, Zh) => "交易已删除",
        (TransactionsDeletePartial, Id) => "Penghapusan transaksi terhenti",
        (TransactionsDeletePartial, En) => "Deleting transactions stopped",
        (TransactionsDeletePartial, Zh) => "删除交易已中断",

        (Saved, Id) => "Data disimpan",
        (Saved, En) => "Saved",
        (Saved, Zh) => "已保存",
        (Deleted, Id) => "Data dihapus",
        (Deleted, En) => "Deleted",
        (Deleted, Zh) => "已删除",
        (Imported, Id) => "Produk diimpor",
        (Imported, En) => "Products imported",
        (Imported, Zh) => "产品已导入",
        (UserAdded, Id) => "Pengguna ditambahkan",
        (UserAdded, En) => "User added",
        (UserAdded, Zh) => "用户已添加",
        (SubscriptionCreateFailed, Id) => "Pengguna dibuat tetapi langganan gagal dibuat. Perpanjang secara manual.",
        (SubscriptionCreateFailed, En) => "User created but subscription creation failed. Please extend subscription manually.",
        (SubscriptionCreateFailed, Zh) => "用户已创建，但订阅创建失败。请手动延长订阅。",
        (SubscriptionExtended, Id) => "Langganan diperpanjang",
        (SubscriptionExtended, En) => "Subscription extended",
        (SubscriptionExtended, Zh) => "订阅已延长",

        (ServerNotResponding, Id) => "Server tidak merespons dengan benar",
        (ServerNotResponding, En) => "The server did not respond correctly",
        (ServerNotResponding, Zh) => "服务器未正确响应",
        (NotFound, Id) => "Data tidak ditemukan",
        (NotFound, En) => "Not found",
        (NotFound, Zh) => "未找到",
        (DataInconsistency, Id) => "Data tidak konsisten",
        (DataInconsistency, En) => "Inconsistent data",
        (DataInconsistency, Zh) => "数据不一致",
        (SettingsSaved, Id) => "Pengaturan disimpan",
        (SettingsSaved, En) => "Settings saved",
        (SettingsSaved, Zh) => "设置已保存",
        (Unexpected, Id) => "Terjadi kesalahan",
        (Unexpected, En) => "Something went wrong",
        (Unexpected, Zh) => "发生错误",
    }
}

/// Receipt captions for a language.
pub fn receipt_labels(language: Language) -> ReceiptLabels {
    match language {
        Language::Id => ReceiptLabels::default(),
        Language::En => ReceiptLabels {
            invoice_number: "Invoice No.".into(),
            invoice_title: "INVOICE".into(),
            cashier: "Cashier".into(),
            customer: "Customer".into(),
            date: "Date".into(),
            phone: "Phone".into(),
            product: "Product".into(),
            barcode: "Barcode".into(),
            price: "Price".into(),
            qty: "Qty".into(),
            subtotal: "Subtotal".into(),
            discount: "Discount".into(),
            tax: "Tax".into(),
            total: "Total".into(),
            pay: "Paid".into(),
            change: "Change".into(),
            general_customer: "Default Customer".into(),
            unknown_product: "Unknown Product".into(),
        },
        Language::Zh => ReceiptLabels {
            invoice_number: "发票号".into(),
            invoice_title: "发票".into(),
            cashier: "收银员".into(),
            customer: "客户".into(),
            date: "日期".into(),
            phone: "电话".into(),
            product: "产品".into(),
            barcode: "条码".into(),
            price: "价格".into(),
            qty: "数量".into(),
            subtotal: "小计".into(),
            discount: "折扣".into(),
            tax: "税".into(),
            total: "总计".into(),
            pay: "付款".into(),
            change: "找零".into(),
            general_customer: "默认客户".into(),
            unknown_product: "未知产品".into(),
        },
    }
}

/// Report placeholders for a language.
pub fn report_labels(language: Language) -> ReportLabels {
    match language {
        Language::Id => ReportLabels::default(),
        Language::En => ReportLabels {
            walk_in_customer: "Default Customer".into(),
            unknown_product: "Unknown Product".into(),
            no_items: "No items".into(),
            unknown_customer: "Unknown Customer".into(),
            unknown_supplier: "Unknown Supplier".into(),
            unknown_cashier: "Unknown Cashier".into(),
        },
        Language::Zh => ReportLabels {
            walk_in_customer: "默认客户".into(),
            unknown_product: "未知产品".into(),
            no_items: "无商品".into(),
            unknown_customer: "未知客户".into(),
            unknown_supplier: "未知供应商".into(),
            unknown_cashier: "未知收银员".into(),
        },
    }
}
