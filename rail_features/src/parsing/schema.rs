//! Column names of the raw snapshot, the reference tables and the feature table.

/// Raw rides snapshot.
pub mod raw {
    pub const ID: &str = "ID";
    pub const ID_BASE: &str = "ID_Base";
    pub const ID_TIMESTAMP: &str = "ID_Timestamp";
    pub const ID_STOP_NUMBER: &str = "ID_Stop_Number";
    pub const PATH: &str = "path";
    pub const EVA_NR: &str = "eva_nr";
    pub const STATION: &str = "station";
    pub const CITY: &str = "city";
    pub const ZIP: &str = "zip";
    pub const LINE: &str = "line";
    pub const LAT: &str = "lat";
    pub const LONG: &str = "long";
    pub const ARRIVAL_PLAN: &str = "arrival_plan";
    pub const DEPARTURE_PLAN: &str = "departure_plan";
    pub const ARRIVAL_DELAY: &str = "arrival_delay_m";
    pub const DEPARTURE_DELAY: &str = "departure_delay_m";
    pub const INFO: &str = "info";
    pub const CANCELED: &str = "canceled";

    /// Columns that must exist regardless of how the key is encoded.
    pub const REQUIRED: [&str; 4] = [ARRIVAL_PLAN, DEPARTURE_PLAN, ARRIVAL_DELAY, DEPARTURE_DELAY];

    pub const SPLIT_KEY: [&str; 3] = [ID_BASE, ID_TIMESTAMP, ID_STOP_NUMBER];
}

/// Station name to IBNR lookup table.
pub mod station_index {
    pub const STATION_NAME: &str = "Station Name";
    pub const IBNR: &str = "IBNR";
}

/// European station reference table.
pub mod european_stations {
    pub const UIC: &str = "uic";
    pub const LATITUDE: &str = "latitude";
    pub const LONGITUDE: &str = "longitude";
    pub const COUNTRY: &str = "country";
}

/// Hand-maintained coordinates keyed by cleaned station name.
pub mod manual_coordinates {
    pub const STATION_NAME: &str = "clear_station_name";
    pub const LAT: &str = "lat";
    pub const LONG: &str = "long";
}

/// Feature table written by the pipeline.
pub mod output {
    pub const BASE_ID: &str = "base_id";
    pub const DEPARTURE_TIME: &str = "departure_time";
    pub const STOP_INDEX: &str = "stop_index";
    pub const STATION_NAME: &str = "station_name";
    pub const STATION_ID: &str = "station_id";
    pub const ORIGIN_STATION_ID: &str = "origin_station_id";
    pub const LINE: &str = "line";
    pub const CITY: &str = "city";
    pub const ZIP: &str = "zip";
    pub const LAT: &str = "lat";
    pub const LONG: &str = "long";
    pub const ARRIVAL_PLAN: &str = "arrival_plan";
    pub const DEPARTURE_PLAN: &str = "departure_plan";
    pub const ARRIVAL_DELAY: &str = "arrival_delay_m";
    pub const DEPARTURE_DELAY: &str = "departure_delay_m";
    pub const INFO: &str = "info";
    pub const CANCELED: &str = "canceled";
    pub const PREV_ARRIVAL_DELAY: &str = "prev_arrival_delay_m";
    pub const PREV_DEPARTURE_DELAY: &str = "prev_departure_delay_m";
    pub const WEIGHTED_AVG_PREV_DELAY: &str = "weighted_avg_prev_delay";
    pub const CUMULATIVE_DELAY: &str = "cumulative_delay";
    pub const DELAY_GAIN: &str = "delay_gain";
    pub const MAX_STOP_INDEX: &str = "max_stop_index";
    pub const STATION_PROGRESS: &str = "station_progress";
    pub const ORIGIN_DEPARTURE_PLAN: &str = "origin_departure_plan";
    pub const PLANNED_ELAPSED_TIME: &str = "planned_elapsed_time";
    pub const TOTAL_PLANNED_TIME: &str = "total_planned_time";
    pub const TIME_PROGRESS: &str = "time_progress";
    pub const PROGRESS_RATIO: &str = "progress_ratio";
    pub const NEXT_ARRIVAL_PLAN: &str = "next_arrival_plan";
    pub const PLANNED_TRAVEL_TIME_TO_NEXT_STOP: &str = "planned_travel_time_to_next_stop";
    pub const DISTANCE_TO_PREV_STOP: &str = "distance_to_prev_stop";
    pub const DISTANCE_TO_NEXT_STOP: &str = "distance_to_next_stop";
    pub const DISTANCE_FROM_ORIGIN: &str = "distance_from_origin";
    pub const TOTAL_DISTANCE: &str = "total_distance";
    pub const DISTANCE_PROGRESS: &str = "distance_progress";
    pub const AVG_CITY_DELAY: &str = "avg_city_delay";
    pub const INFO_PRESENT: &str = "info_present";
    pub const TRANSFORMED_INFO_MESSAGE: &str = "transformed_info_message";
    pub const INFO_LABEL_ENCODED: &str = "info_label_encoded";
    pub const LINE_CATEGORY: &str = "line_category";
    pub const AVG_DISTANCE_BETWEEN_STOPS: &str = "avg_distance_between_stops";
    pub const FINAL_TRAIN_TYPE: &str = "final_train_type";
}
