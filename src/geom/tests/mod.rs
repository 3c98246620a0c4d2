mod test_polyline_sampling;
mod test_section_basic;
mod test_shape_basic;
