//! Sheet names and column headers of the interchange workbook.
//!
//! The headers are part of the file format: other tools read and write the
//! same workbook, so spellings (including the odd ones) must not change.

pub const VERSION_SHEET: &str = "Version";
pub const LOOKUP_SHEET: &str = "LookUpTable";

pub mod version {
    pub const VERSION: &str = "Version";
    pub const DATE: &str = "Date";
    pub const EDITOR: &str = "Last Modified By";
    pub const EDITOR_ALIAS: &str = "Editor";
    pub const DESCRIPTION: &str = "Description";
    /// Accepted spellings of the description column, in lookup order.
    pub const DESCRIPTION_ALIASES: &[&str] =
        &["Description", "description", "DESCRIPTION", "Desc", "DESC"];

    pub const HEADERS: [&str; 4] = [VERSION, DATE, EDITOR, DESCRIPTION];
}

pub mod config {
    pub const SOC_NAME: &str = "SOC Name";
    pub const TYPE_OF_BIN: &str = "TypeOfBin";

    /// Column where the core table starts on export (column E).
    pub const CORE_TABLE_COLUMN: usize = 4;

    pub const SOC: &str = "SOC";
    pub const CORE: &str = "CORE";
    pub const ROLE: &str = "Master/Slave";
    pub const IS_QNX: &str = "Is Qnx Core ?";
    pub const IS_AUTOSAR: &str = "Is Autosar Compliant ?";
    pub const IS_SIM: &str = "Is Sim Core ?";
    pub const OS: &str = "OS";
    pub const SOC_FAMILY: &str = "SOC Family";
    pub const DESCRIPTION: &str = "Description";

    pub const CORE_HEADERS: [&str; 9] = [
        SOC,
        CORE,
        ROLE,
        IS_QNX,
        IS_AUTOSAR,
        IS_SIM,
        OS,
        SOC_FAMILY,
        DESCRIPTION,
    ];
}

pub mod lookup {
    /// Holds the signal name, despite the header.
    pub const NAME: &str = "Data_Type";
    pub const PORT_NAME: &str = "Variable_Port_Name";
    pub const MEMORY_REGION: &str = "Memory Region";
    pub const BUFFER_COUNT: &str = "Buffer count_IPC";
    pub const TYPE: &str = "Type";
    pub const INIT_VALUE: &str = "InitValue";
    pub const NOTIFIERS: &str = "Notifiers";
    pub const SOURCE: &str = "Source";
    pub const IMPL_APPROACH: &str = "Impl_Approach";
    pub const GET_OBJ_REF: &str = "GetObjRef";
    pub const SM_BUFF_COUNT: &str = "SM_Buff_Count";
    pub const TIMEOUT: &str = "Timeout";
    pub const PERIODICITY: &str = "Periodicity";
    pub const ASIL: &str = "ASIL";
    pub const CHECKSUM: &str = "Checksum";
    pub const DATA_TYPE: &str = "DataType";
    pub const DESCRIPTION: &str = "description";

    /// Fixed columns in file order. Any other header is a destination core.
    pub const FIXED_HEADERS: [&str; 17] = [
        NAME,
        PORT_NAME,
        MEMORY_REGION,
        BUFFER_COUNT,
        TYPE,
        INIT_VALUE,
        NOTIFIERS,
        SOURCE,
        IMPL_APPROACH,
        GET_OBJ_REF,
        SM_BUFF_COUNT,
        TIMEOUT,
        PERIODICITY,
        ASIL,
        CHECKSUM,
        DATA_TYPE,
        DESCRIPTION,
    ];

    pub fn is_fixed(header: &str) -> bool {
        FIXED_HEADERS.contains(&header)
    }
}
