/// Civil IoT Taiwan water-resource SensorThings API
pub const STA_API: &str = "https://sta.ci.taiwan.gov.tw/STA_WaterResource_v2/v1.0";

// Entity collections
pub const THINGS: &str = "/Things";

/// `$expand` clause embedding each station's flood-depth datastream with its
/// single most recent observation (the server sorts and limits, so a record
/// never carries more than one reading).
pub const LATEST_OBSERVATION_EXPAND: &str =
    "Datastreams($filter=name eq '淹水深度';$expand=Observations($orderby=phenomenonTime desc;$top=1))";
