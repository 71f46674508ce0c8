mod intervals;
