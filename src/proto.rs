//https://www.avsforum.com/attachments/hdmi-cec-v1-3a-specifications-pdf.2579760/

use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Maximum size of a CEC frame on the wire: header + opcode + 14 payload bytes.
pub const CEC_MAX_FRAME_SIZE: usize = 16;
/// Maximum payload length of a single CEC message.
pub const CEC_MAX_PAYLOAD: usize = CEC_MAX_FRAME_SIZE - 2;

/**
 * The logical addresses defined by CEC.
 *
 * 15 doubles as the broadcast destination and the unregistered
 * initiator address.
 */
#[derive(Debug, Eq, PartialEq, TryFromPrimitive, IntoPrimitive, Clone, Copy)]
#[repr(u8)]
pub enum CecLogicalAddress {
    Tv = 0,
    Record1 = 1,
    Record2 = 2,
    Tuner1 = 3,
    Playback1 = 4,
    Audiosystem = 5,
    Tuner2 = 6,
    Tuner3 = 7,
    Playback2 = 8,
    Record3 = 9,
    Tuner4 = 10,
    Playback3 = 11,
    Reserved1 = 12,
    Reserved2 = 13,
    Specific = 14,
    /// as initiator address
    UnregisteredBroadcast = 15,
}

impl CecLogicalAddress {
    /// Role name per CEC Table 5.
    pub fn description(self) -> &'static str {
        match self {
            CecLogicalAddress::Tv => "TV",
            CecLogicalAddress::Record1 => "Recording Device 1",
            CecLogicalAddress::Record2 => "Recording Device 2",
            CecLogicalAddress::Tuner1 => "Tuner 1",
            CecLogicalAddress::Playback1 => "Playback Device 1",
            CecLogicalAddress::Audiosystem => "Audio System",
            CecLogicalAddress::Tuner2 => "Tuner 2",
            CecLogicalAddress::Tuner3 => "Tuner 3",
            CecLogicalAddress::Playback2 => "Playback Device 2",
            CecLogicalAddress::Record3 => "Recording Device 3",
            CecLogicalAddress::Tuner4 => "Tuner 4",
            CecLogicalAddress::Playback3 => "Playback Device 3",
            CecLogicalAddress::Reserved1 | CecLogicalAddress::Reserved2 => "(Reserved)",
            CecLogicalAddress::Specific => "Specific Use",
            CecLogicalAddress::UnregisteredBroadcast => "Unregistered/Broadcast",
        }
    }
    /// The `[Device Type]` operand class this address belongs to,
    /// `None` for reserved/specific/unregistered addresses.
    pub fn device_type(self) -> Option<CecDeviceType> {
        match self {
            CecLogicalAddress::Tv => Some(CecDeviceType::Tv),
            CecLogicalAddress::Record1
            | CecLogicalAddress::Record2
            | CecLogicalAddress::Record3 => Some(CecDeviceType::Record),
            CecLogicalAddress::Tuner1
            | CecLogicalAddress::Tuner2
            | CecLogicalAddress::Tuner3
            | CecLogicalAddress::Tuner4 => Some(CecDeviceType::Tuner),
            CecLogicalAddress::Playback1
            | CecLogicalAddress::Playback2
            | CecLogicalAddress::Playback3 => Some(CecDeviceType::Playback),
            CecLogicalAddress::Audiosystem => Some(CecDeviceType::Audiosystem),
            _ => None,
        }
    }
    #[inline]
    pub fn is_broadcast(self) -> bool {
        self == CecLogicalAddress::UnregisteredBroadcast
    }
}

/// `[Device Type]` operand. Refer to CEC 17.
#[derive(Debug, Eq, PartialEq, TryFromPrimitive, IntoPrimitive, Copy, Clone)]
#[repr(u8)]
pub enum CecDeviceType {
    Tv = 0,
    Record = 1,
    Tuner = 3,
    Playback = 4,
    Audiosystem = 5,
    Switch = 6,
}

/// `[CEC Version]` operand for [CecOpcode::CecVersion].
#[derive(Debug, Eq, PartialEq, TryFromPrimitive, IntoPrimitive, Copy, Clone)]
#[repr(u8)]
pub enum Version {
    V1_1 = 0,
    V1_2 = 1,
    V1_2A = 2,
    V1_3 = 3,
    V1_3A = 4,
    V1_4 = 5,
}

impl Version {
    pub fn description(self) -> &'static str {
        match self {
            Version::V1_1 => "1.1",
            Version::V1_2 => "1.2",
            Version::V1_2A => "1.2a",
            Version::V1_3 => "1.3",
            Version::V1_3A => "1.3a",
            Version::V1_4 => "1.4",
        }
    }
}

/// Payload of [CecOpcode::ReportPowerStatus].
#[derive(Debug, Eq, PartialEq, TryFromPrimitive, IntoPrimitive, Clone, Copy)]
#[repr(u8)]
pub enum CecPowerStatus {
    On = 0,
    Standby = 1,
    InTransitionStandbyToOn = 2,
    InTransitionOnToStandby = 3,
}

impl CecPowerStatus {
    pub fn description(self) -> &'static str {
        match self {
            CecPowerStatus::On => "On",
            CecPowerStatus::Standby => "Standby",
            CecPowerStatus::InTransitionStandbyToOn => "In transition Standby to On",
            CecPowerStatus::InTransitionOnToStandby => "In transition On to Standby",
        }
    }
}

/// `[System Audio Status]` operand of [CecOpcode::SetSystemAudioMode] and
/// [CecOpcode::SystemAudioModeStatus].
#[derive(Debug, Eq, PartialEq, TryFromPrimitive, IntoPrimitive, Clone, Copy)]
#[repr(u8)]
pub enum SystemAudioStatus {
    Off = 0,
    On = 1,
}

/// used by [CecOpcode::FeatureAbort]
#[derive(Debug, Eq, PartialEq, TryFromPrimitive, IntoPrimitive, Clone, Copy)]
#[repr(u8)]
pub enum CecAbortReason {
    /// Unrecognized opcode
    Unrecognized = 0,
    /// Not in correct mode to respond
    WrongMode = 1,
    /// Cannot provide source
    NoSource = 2,
    /// Invalid operand
    InvalidOp = 3,
    Refused = 4,
    Other = 5,
}

bitflags! {
    /// Error condition bits reported by the CEC transport peripheral.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CecErrors: u8 {
        /// Overrun while receiving
        const OERR   = (1 << 0);
        /// Undefined transfer error
        const UERR   = (1 << 1);
        /// Missing acknowledge
        const ACKERR = (1 << 2);
        /// Abnormal termination while receiving
        const TERR   = (1 << 3);
        /// Transmission failure
        const TXERR  = (1 << 4);
        /// Arbitration lost
        const AERR   = (1 << 5);
        /// Bus lock detected
        const BLERR  = (1 << 6);
    }
}

impl CecErrors {
    /// Bits that mean an outgoing message genuinely failed.
    pub const TX_FAULTS: CecErrors = CecErrors::UERR
        .union(CecErrors::ACKERR)
        .union(CecErrors::TXERR)
        .union(CecErrors::AERR)
        .union(CecErrors::BLERR);
    /// Bits that abort a reception in progress.
    pub const RX_ABORT: CecErrors = CecErrors::OERR.union(CecErrors::TERR);
}

bitflags! {
    /// CEC end-user and supporting features. Refer to CEC 3.1 and 3.2.
    ///
    /// Each opcode belongs to one or more features, see [CecOpcode::features].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CecFeatures: u32 {
        const ONE_TOUCH_PLAY                = 0x1;
        const SYSTEM_STANDBY                = 0x2;
        const ONE_TOUCH_RECORD              = 0x4;
        const TIMER_PROGRAMMING             = 0x8;
        const DECK_CONTROL                  = 0x10;
        const TUNER_CONTROL                 = 0x20;
        const DEVICE_MENU_CONTROL           = 0x40;
        const REMOTE_CONTROL_PASS_THROUGH   = 0x80;
        const SYSTEM_AUDIO_CONTROL          = 0x100;
        const DEVICE_OSD_NAME_TRANS         = 0x200;
        const DEVICE_POWER_STATUS           = 0x400;
        const OSD_DISPLAY                   = 0x800;
        const ROUTING_CONTROL               = 0x1000;
        const SYSTEM_INFO                   = 0x2000;
        const VENDOR_SPECIFIC               = 0x4000;
        const AUDIO_RATE_CONTROL            = 0x8000;
        const AUDIO_RETURN_CHANNEL_CONTROL  = 0x10000;
        const CAPABILITY_DISCOVERY_AND_CONTROL = 0x20000;
    }
}

#[derive(Debug, Eq, PartialEq, TryFromPrimitive, IntoPrimitive, Clone, Copy)]
#[repr(u8)]
pub enum CecOpcode {
    /* General Protocol Messages */
    /// Rejects an opcode the receiver does not support.
    /// __Parameters:__ [CecOpcode], [CecAbortReason]
    FeatureAbort = 0x00,
    /// Requests any response, used for testing.
    Abort = 0xff,

    /* One Touch Play / Routing Control Feature */
    /// A source has started to transmit a stream, or answers
    /// [CecOpcode::RequestActiveSource].
    /// __Parameters:__ 2 byte physical address of the active source
    ActiveSource = 0x82,
    /// Sent by a source entering the active state; the TV should turn on.
    ImageViewOn = 0x04,
    /// As [CecOpcode::ImageViewOn], but also removes text/menus/PIP.
    TextViewOn = 0x0d,
    /// The active source has no video to present or goes to standby.
    /// __Parameters:__ 2 byte physical address
    InactiveSource = 0x9d,
    /// Used by a new device to discover the status of the system.
    RequestActiveSource = 0x85,
    /// A CEC switch was manually switched.
    /// __Parameters:__ 2 byte old + 2 byte new physical address
    RoutingChange = 0x80,
    /// Active route below a CEC switch.
    /// __Parameters:__ 2 byte physical address
    RoutingInformation = 0x81,
    /// The TV requests a streaming path.
    /// __Parameters:__ 2 byte physical address
    SetStreamPath = 0x86,

    /* Standby Feature */
    /// Turn off the destination (may be broadcast). No payload.
    Standby = 0x36,

    /* One Touch Record Feature */
    RecordOff = 0x0b,
    RecordOn = 0x09,
    RecordStatus = 0x0a,
    RecordTvScreen = 0x0f,

    /* Timer Programming Feature */
    ClearAnalogueTimer = 0x33,
    ClearDigitalTimer = 0x99,
    ClearExtTimer = 0xa1,
    SetAnalogueTimer = 0x34,
    SetDigitalTimer = 0x97,
    SetExtTimer = 0xa2,
    SetTimerProgramTitle = 0x67,
    TimerClearedStatus = 0x43,
    TimerStatus = 0x35,

    /* Deck Control Feature */
    DeckControl = 0x42,
    DeckStatus = 0x1b,
    GiveDeckStatus = 0x1a,
    Play = 0x41,

    /* Tuner Control Feature */
    GiveTunerDeviceStatus = 0x08,
    SelectAnalogueService = 0x92,
    SelectDigitalService = 0x93,
    TunerDeviceStatus = 0x07,
    TunerStepDecrement = 0x06,
    TunerStepIncrement = 0x05,

    /* Device Menu Control Feature */
    MenuRequest = 0x8d,
    MenuStatus = 0x8e,
    /// A remote control button was pressed.
    /// __Parameters:__ 1 byte [CecUserControlCode]
    UserControlPressed = 0x44,
    /// The button indicated by [CecOpcode::UserControlPressed] was released.
    UserControlReleased = 0x45,

    /* System Audio Control Feature */
    /// Requests an amplifier to send its volume and mute status via
    /// [CecOpcode::ReportAudioStatus].
    GiveAudioStatus = 0x71,
    /// Requests a [CecOpcode::SystemAudioModeStatus] report.
    GiveSystemAudioModeStatus = 0x7d,
    /// Current audio volume status.
    /// __Parameters:__ 1 byte, bit7 mute, bits 0..=6 volume percent
    ReportAudioStatus = 0x7a,
    ReportShortAudioDescriptor = 0xa3,
    RequestShortAudioDescriptor = 0xa4,
    /// Turns the System Audio Mode on or off.
    /// __Parameters:__ 1 byte [SystemAudioStatus]
    SetSystemAudioMode = 0x72,
    /// Requests the amplifier to enter/leave System Audio Mode.
    /// __Parameters:__ 2 byte physical address of the audio stream source,
    /// or no payload to request termination
    SystemAudioModeRequest = 0x70,
    /// Reports the current status of the System Audio Mode.
    /// __Parameters:__ 1 byte [SystemAudioStatus]
    SystemAudioModeStatus = 0x7e,

    /* Device OSD Transfer / OSD Display Feature */
    /// Requests a [CecOpcode::SetOsdName]. No payload.
    GiveOsdName = 0x46,
    /// Answer to [CecOpcode::GiveOsdName].
    /// __Parameters:__ device name, up to 14 bytes, no terminator
    SetOsdName = 0x47,
    /// Text message to output on a TV.
    SetOsdString = 0x64,

    /* Power Status Feature */
    /// Requests a [CecOpcode::ReportPowerStatus].
    GiveDevicePowerStatus = 0x8f,
    /// Answer to [CecOpcode::GiveDevicePowerStatus].
    /// __Parameters:__ 1 byte [CecPowerStatus]
    ReportPowerStatus = 0x90,

    /* System Information Feature */
    /// Reports the supported CEC version, in response to
    /// [CecOpcode::GetCecVersion].
    /// __Parameters:__ [Version]
    CecVersion = 0x9e,
    GetCecVersion = 0x9f,
    /// Requests a [CecOpcode::ReportPhysicalAddr]. No payload.
    GivePhysicalAddr = 0x83,
    GetMenuLanguage = 0x91,
    /// Maps the initiator's physical to its logical address, broadcast.
    /// __Parameters:__ 2 byte physical address, 1 byte [CecDeviceType]
    ReportPhysicalAddr = 0x84,
    SetMenuLanguage = 0x32,

    /* Vendor Specific Commands Feature */
    /// Reports the vendor ID of this device, broadcast.
    /// __Parameters:__ 3 byte IEEE OUI
    DeviceVendorId = 0x87,
    /// Requests a [CecOpcode::DeviceVendorId]. No payload.
    GiveDeviceVendorId = 0x8c,
    VendorCommand = 0x89,
    VendorCommandWithId = 0xa0,
    VendorRemoteButtonDown = 0x8a,
    VendorRemoteButtonUp = 0x8b,

    /* Audio Rate Control Feature */
    SetAudioRate = 0x9a,

    /* Audio Return Channel Control Feature */
    InitiateArc = 0xc0,
    ReportArcInitiated = 0xc1,
    ReportArcTerminated = 0xc2,
    RequestArcInitiation = 0xc3,
    RequestArcTermination = 0xc4,
    TerminateArc = 0xc5,

    /* Capability Discovery and Control Feature */
    CdcMessage = 0xf8,
}

impl CecOpcode {
    /// Human readable description, per CEC 15.
    pub fn description(self) -> &'static str {
        match self {
            CecOpcode::FeatureAbort => "Feature Abort",
            CecOpcode::Abort => "Abort Message",
            CecOpcode::ActiveSource => "Active Source",
            CecOpcode::ImageViewOn => "Image View On",
            CecOpcode::TextViewOn => "Text View On",
            CecOpcode::Standby => "Standby",
            CecOpcode::RecordOff => "Record Off",
            CecOpcode::RecordOn => "Record On",
            CecOpcode::RecordStatus => "Record Status",
            CecOpcode::RecordTvScreen => "Record TV Screen",
            CecOpcode::ClearAnalogueTimer => "Clear Analogue Timer",
            CecOpcode::ClearDigitalTimer => "Clear Digital Timer",
            CecOpcode::ClearExtTimer => "Clear External Timer",
            CecOpcode::SetAnalogueTimer => "Set Analogue Timer",
            CecOpcode::SetDigitalTimer => "Set Digital Timer",
            CecOpcode::SetExtTimer => "Set External Timer",
            CecOpcode::SetTimerProgramTitle => "Set Timer Program Title",
            CecOpcode::TimerClearedStatus => "Timer Cleared Status",
            CecOpcode::TimerStatus => "Timer Status",
            CecOpcode::DeckControl => "Deck Control",
            CecOpcode::DeckStatus => "Deck Status",
            CecOpcode::GiveDeckStatus => "Give Deck Status",
            CecOpcode::Play => "Play",
            CecOpcode::GiveTunerDeviceStatus => "Give Tuner Status",
            CecOpcode::SelectAnalogueService => "Select Analogue Service",
            CecOpcode::SelectDigitalService => "Select Digital Service",
            CecOpcode::TunerDeviceStatus => "Tuner Device Status",
            CecOpcode::TunerStepDecrement => "Tuner Step Decrement",
            CecOpcode::TunerStepIncrement => "Tuner Step Increment",
            CecOpcode::MenuRequest => "Menu Request",
            CecOpcode::MenuStatus => "Menu Status",
            CecOpcode::UserControlPressed => "User Control Pressed",
            CecOpcode::UserControlReleased => "User Control Released",
            CecOpcode::GiveAudioStatus => "Give Audio Status",
            CecOpcode::GiveSystemAudioModeStatus => "Give Audio Mode Status",
            CecOpcode::ReportAudioStatus => "Report Audio Status",
            CecOpcode::ReportShortAudioDescriptor => "Report Short Audio Descriptor",
            CecOpcode::RequestShortAudioDescriptor => "Request Short Audio Descriptor",
            CecOpcode::SetSystemAudioMode => "Set System Audio Mode",
            CecOpcode::SystemAudioModeRequest => "System Audio Mode Request",
            CecOpcode::SystemAudioModeStatus => "System Audio Mode Status",
            CecOpcode::GiveOsdName => "Give OSD Name",
            CecOpcode::SetOsdName => "Set OSD Name",
            CecOpcode::SetOsdString => "Set OSD String",
            CecOpcode::GiveDevicePowerStatus => "Give Power Status",
            CecOpcode::ReportPowerStatus => "Report Power Status",
            CecOpcode::InactiveSource => "Inactive Source",
            CecOpcode::RequestActiveSource => "Request Active Source",
            CecOpcode::RoutingChange => "Routing Change",
            CecOpcode::RoutingInformation => "Routing Information",
            CecOpcode::SetStreamPath => "Set Stream Path",
            CecOpcode::CecVersion => "CEC Version",
            CecOpcode::GetCecVersion => "Get CEC Version",
            CecOpcode::GivePhysicalAddr => "Give Physical Address",
            CecOpcode::GetMenuLanguage => "Get Menu Language",
            CecOpcode::ReportPhysicalAddr => "Report Physical Address",
            CecOpcode::SetMenuLanguage => "Set Menu Language",
            CecOpcode::DeviceVendorId => "Device Vendor ID",
            CecOpcode::GiveDeviceVendorId => "Give Device Vendor ID",
            CecOpcode::VendorCommand => "Vendor Command",
            CecOpcode::VendorCommandWithId => "Vendor Command w/ ID",
            CecOpcode::VendorRemoteButtonDown => "Vendor Remote Button Down",
            CecOpcode::VendorRemoteButtonUp => "Vendor Remote Button Up",
            CecOpcode::SetAudioRate => "Set Audio Rate",
            CecOpcode::InitiateArc => "Initiate ARC",
            CecOpcode::ReportArcInitiated => "Report ARC Initiated",
            CecOpcode::ReportArcTerminated => "Report ARC Terminated",
            CecOpcode::RequestArcInitiation => "Request ARC Initiation",
            CecOpcode::RequestArcTermination => "Request ARC Termination",
            CecOpcode::TerminateArc => "Terminate ARC",
            CecOpcode::CdcMessage => "CDC Message",
        }
    }

    /// The feature bit(s) an opcode belongs to. Refer to CEC 3.1 and 3.2.
    pub fn features(self) -> CecFeatures {
        match self {
            CecOpcode::FeatureAbort | CecOpcode::Abort => CecFeatures::all(),
            CecOpcode::ActiveSource => {
                CecFeatures::ONE_TOUCH_PLAY | CecFeatures::ROUTING_CONTROL
            }
            CecOpcode::ImageViewOn | CecOpcode::TextViewOn => CecFeatures::ONE_TOUCH_PLAY,
            CecOpcode::Standby => CecFeatures::SYSTEM_STANDBY,
            CecOpcode::RecordOff
            | CecOpcode::RecordOn
            | CecOpcode::RecordStatus
            | CecOpcode::RecordTvScreen => CecFeatures::ONE_TOUCH_RECORD,
            CecOpcode::ClearAnalogueTimer
            | CecOpcode::ClearDigitalTimer
            | CecOpcode::ClearExtTimer
            | CecOpcode::SetAnalogueTimer
            | CecOpcode::SetDigitalTimer
            | CecOpcode::SetExtTimer
            | CecOpcode::SetTimerProgramTitle
            | CecOpcode::TimerClearedStatus
            | CecOpcode::TimerStatus => CecFeatures::TIMER_PROGRAMMING,
            CecOpcode::DeckControl
            | CecOpcode::DeckStatus
            | CecOpcode::GiveDeckStatus
            | CecOpcode::Play => CecFeatures::DECK_CONTROL,
            CecOpcode::GiveTunerDeviceStatus
            | CecOpcode::SelectAnalogueService
            | CecOpcode::SelectDigitalService
            | CecOpcode::TunerDeviceStatus
            | CecOpcode::TunerStepDecrement
            | CecOpcode::TunerStepIncrement => CecFeatures::TUNER_CONTROL,
            CecOpcode::MenuRequest | CecOpcode::MenuStatus => {
                CecFeatures::DEVICE_MENU_CONTROL
            }
            CecOpcode::UserControlPressed | CecOpcode::UserControlReleased => {
                CecFeatures::DEVICE_MENU_CONTROL
                    | CecFeatures::REMOTE_CONTROL_PASS_THROUGH
                    | CecFeatures::SYSTEM_AUDIO_CONTROL
            }
            CecOpcode::GiveAudioStatus
            | CecOpcode::GiveSystemAudioModeStatus
            | CecOpcode::ReportAudioStatus
            | CecOpcode::ReportShortAudioDescriptor
            | CecOpcode::RequestShortAudioDescriptor
            | CecOpcode::SetSystemAudioMode
            | CecOpcode::SystemAudioModeRequest
            | CecOpcode::SystemAudioModeStatus => CecFeatures::SYSTEM_AUDIO_CONTROL,
            CecOpcode::GiveOsdName | CecOpcode::SetOsdName => {
                CecFeatures::DEVICE_OSD_NAME_TRANS
            }
            CecOpcode::SetOsdString => CecFeatures::OSD_DISPLAY,
            CecOpcode::GiveDevicePowerStatus | CecOpcode::ReportPowerStatus => {
                CecFeatures::DEVICE_POWER_STATUS
            }
            CecOpcode::InactiveSource
            | CecOpcode::RequestActiveSource
            | CecOpcode::RoutingChange
            | CecOpcode::RoutingInformation
            | CecOpcode::SetStreamPath => CecFeatures::ROUTING_CONTROL,
            CecOpcode::CecVersion | CecOpcode::GetCecVersion => {
                CecFeatures::SYSTEM_INFO | CecFeatures::VENDOR_SPECIFIC
            }
            CecOpcode::GivePhysicalAddr
            | CecOpcode::GetMenuLanguage
            | CecOpcode::ReportPhysicalAddr
            | CecOpcode::SetMenuLanguage => CecFeatures::SYSTEM_INFO,
            CecOpcode::DeviceVendorId
            | CecOpcode::GiveDeviceVendorId
            | CecOpcode::VendorCommand
            | CecOpcode::VendorCommandWithId
            | CecOpcode::VendorRemoteButtonDown
            | CecOpcode::VendorRemoteButtonUp => CecFeatures::VENDOR_SPECIFIC,
            CecOpcode::SetAudioRate => CecFeatures::AUDIO_RATE_CONTROL,
            CecOpcode::InitiateArc
            | CecOpcode::ReportArcInitiated
            | CecOpcode::ReportArcTerminated
            | CecOpcode::RequestArcInitiation
            | CecOpcode::RequestArcTermination
            | CecOpcode::TerminateArc => CecFeatures::AUDIO_RETURN_CHANNEL_CONTROL,
            CecOpcode::CdcMessage => CecFeatures::CAPABILITY_DISCOVERY_AND_CONTROL,
        }
    }
}

/// Description of a possibly unknown opcode byte, for log lines.
pub fn opcode_description(raw: u8) -> &'static str {
    match CecOpcode::try_from(raw) {
        Ok(op) => op.description(),
        Err(_) => "Unknown Opcode",
    }
}

/// parameter for [CecOpcode::UserControlPressed]. Refer to CEC Table 30.
#[derive(Debug, Eq, PartialEq, TryFromPrimitive, IntoPrimitive, Clone, Copy)]
#[repr(u8)]
pub enum CecUserControlCode {
    Select = 0x00,
    Up = 0x01,
    Down = 0x02,
    Left = 0x03,
    Right = 0x04,
    RightUp = 0x05,
    RightDown = 0x06,
    LeftUp = 0x07,
    LeftDown = 0x08,
    RootMenu = 0x09,
    SetupMenu = 0x0a,
    ContentsMenu = 0x0b,
    FavoriteMenu = 0x0c,
    Exit = 0x0d,
    Number0 = 0x20,
    Number1 = 0x21,
    Number2 = 0x22,
    Number3 = 0x23,
    Number4 = 0x24,
    Number5 = 0x25,
    Number6 = 0x26,
    Number7 = 0x27,
    Number8 = 0x28,
    Number9 = 0x29,
    Dot = 0x2a,
    Enter = 0x2b,
    Clear = 0x2c,
    NextFavorite = 0x2f,
    ChannelUp = 0x30,
    ChannelDown = 0x31,
    PreviousChannel = 0x32,
    SoundSelect = 0x33,
    InputSelect = 0x34,
    DisplayInformation = 0x35,
    Help = 0x36,
    PageUp = 0x37,
    PageDown = 0x38,
    Power = 0x40,
    VolumeUp = 0x41,
    VolumeDown = 0x42,
    Mute = 0x43,
    Play = 0x44,
    Stop = 0x45,
    Pause = 0x46,
    Record = 0x47,
    Rewind = 0x48,
    FastForward = 0x49,
    Eject = 0x4a,
    Forward = 0x4b,
    Backward = 0x4c,
    StopRecord = 0x4d,
    PauseRecord = 0x4e,
    Angle = 0x50,
    SubPicture = 0x51,
    VideoOnDemand = 0x52,
    ElectronicProgramGuide = 0x53,
    TimerProgramming = 0x54,
    InitialConfiguration = 0x55,
    PlayFunction = 0x60,
    PausePlayFunction = 0x61,
    RecordFunction = 0x62,
    PauseRecordFunction = 0x63,
    StopFunction = 0x64,
    MuteFunction = 0x65,
    RestoreVolumeFunction = 0x66,
    TuneFunction = 0x67,
    SelectMediaFunction = 0x68,
    SelectAvInputFunction = 0x69,
    SelectAudioInputFunction = 0x6a,
    PowerToggleFunction = 0x6b,
    PowerOffFunction = 0x6c,
    PowerOnFunction = 0x6d,
    F1Blue = 0x71,
    F2Red = 0x72,
    F3Green = 0x73,
    F4Yellow = 0x74,
    F5 = 0x75,
    Data = 0x76,
}

/// 24-bit IEEE OUI identifying a device vendor.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VendorID(pub [u8; 3]);

/**
 * An HDMI physical address: four nibbles a.b.c.d describing the device's
 * port position below the root (TV at 0.0.0.0).
 *
 * Stored least significant digit first: `addr.0[3]` is `a`, `addr.0[0]`
 * is `d`. The address `3.1.0.0` is `PhysicalAddress([0, 0, 1, 3])`.
 */
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalAddress(pub [u8; 4]);

impl PhysicalAddress {
    /// Wire operand of [CecOpcode::ReportPhysicalAddr] and friends:
    /// `a.b` packed in the first byte, `c.d` in the second.
    pub fn to_operand(self) -> [u8; 2] {
        [
            (self.0[3] << 4) | (self.0[2] & 0xf),
            (self.0[1] << 4) | (self.0[0] & 0xf),
        ]
    }
    pub fn from_operand(bytes: [u8; 2]) -> Self {
        PhysicalAddress([
            bytes[1] & 0x0f,
            bytes[1] >> 4,
            bytes[0] & 0x0f,
            bytes[0] >> 4,
        ])
    }
}

impl std::fmt::Display for PhysicalAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:x}.{:x}.{:x}.{:x}",
            self.0[3], self.0[2], self.0[1], self.0[0]
        )
    }
}

/**
 * Fixed-capacity ascii device name, as carried by [CecOpcode::SetOsdName].
 *
 * Create it from a String (has to be ascii)
 * ```
 * # use cec_device::OSDStr;
 * let name: OSDStr::<14> = "living room".to_string().try_into().unwrap();
 * ```
 */
#[repr(transparent)]
#[derive(Clone)]
pub struct OSDStr<const MAX: usize>([u8; MAX]);

impl<const MAX: usize> OSDStr<MAX> {
    /// The name bytes up to the first nul, as sent on the wire.
    pub fn as_bytes(&self) -> &[u8] {
        let len = self.0.iter().position(|&b| b == 0).unwrap_or(MAX);
        &self.0[..len]
    }
}

// from a received payload
impl<const MAX: usize> From<&[u8]> for OSDStr<MAX> {
    fn from(value: &[u8]) -> Self {
        let mut osd = OSDStr::default();
        let len = MAX.min(value.len());
        osd.0[..len].clone_from_slice(&value[..len]);
        osd
    }
}

impl<const MAX: usize> TryFrom<String> for OSDStr<MAX> {
    type Error = ();
    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_ascii() && value.len() <= MAX {
            let mut v = value.into_bytes();
            v.resize(MAX, 0);
            let a = v.try_into().unwrap(); //len is ok
            return Ok(OSDStr(a));
        }
        Err(())
    }
}

impl<const MAX: usize> AsRef<str> for OSDStr<MAX> {
    fn as_ref(&self) -> &str {
        std::str::from_utf8(self.as_bytes()).unwrap_or_default()
    }
}
impl<const MAX: usize> std::fmt::Display for OSDStr<MAX> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}
impl<const MAX: usize> std::fmt::Debug for OSDStr<MAX> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}
impl<const MAX: usize> Default for OSDStr<MAX> {
    fn default() -> Self {
        Self([0; MAX])
    }
}
